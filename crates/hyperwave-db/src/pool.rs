//! Database connection pool and schema

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Database connection pool type alias
pub type DbPool = SqlitePool;

/// Pool tuning
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Open (creating if missing) a SQLite database file
pub async fn create_pool(database_path: &str) -> Result<DbPool, sqlx::Error> {
    create_pool_with_options(database_path, PoolOptions::default()).await
}

/// Open a SQLite database file with explicit pool options
pub async fn create_pool_with_options(
    database_path: &str,
    options: PoolOptions,
) -> Result<DbPool, sqlx::Error> {
    let connect = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .acquire_timeout(options.acquire_timeout)
        .connect_with(connect)
        .await
}

/// In-memory database. Every connection to `:memory:` is a separate
/// database, so the pool is pinned to one connection that never recycles.
pub async fn create_memory_pool() -> Result<DbPool, sqlx::Error> {
    let connect = SqliteConnectOptions::from_str("sqlite::memory:")?;

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(connect)
        .await
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        created_at INTEGER NOT NULL,
        last_login_at INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tokens (
        token TEXT PRIMARY KEY,
        email TEXT NOT NULL,
        expires_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    "CREATE INDEX IF NOT EXISTS idx_tokens_email ON tokens(email)",
    "CREATE INDEX IF NOT EXISTS idx_tokens_expires_at ON tokens(expires_at)",
];

/// Create tables and indices. Idempotent.
pub async fn migrate(pool: &DbPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("Database schema ready");
    Ok(())
}
