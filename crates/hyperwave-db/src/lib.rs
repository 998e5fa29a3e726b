//! Hyperwave DB - Store for users and single-use tokens
//!
//! SQLx/SQLite layer behind the authentication core.
//!
//! # Example
//!
//! ```rust,ignore
//! use hyperwave_db::{create_pool, migrate, Repositories, TokenRepository};
//!
//! let pool = create_pool("app.db").await?;
//! migrate(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! repos.tokens.store("token", "user@example.com", 900).await?;
//! ```

pub mod cleanup;
pub mod error;
pub mod models;
pub mod pool;
pub mod repo;
pub mod sqlite;

pub use cleanup::{cleanup_expired_tokens, spawn_token_cleanup, DEFAULT_CLEANUP_INTERVAL};
pub use error::{DbError, DbResult};
pub use models::*;
pub use pool::{create_memory_pool, create_pool, create_pool_with_options, migrate, DbPool, PoolOptions};
pub use repo::*;
pub use sqlite::{Repositories, SqliteTokenRepository, SqliteUserRepository};
