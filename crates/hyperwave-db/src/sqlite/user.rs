//! SQLite user repository implementation

use async_trait::async_trait;
use chrono::Utc;
use hyperwave_types::UserId;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use crate::models::UserRow;
use crate::repo::UserRepository;

/// SQLite user repository
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, email: &str) -> DbResult<UserRow> {
        let now = Utc::now().timestamp_millis();

        // Existing users win; the insert is a no-op for a known email.
        sqlx::query(
            r#"
            INSERT INTO users (id, email, created_at, last_login_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(UserId::new().to_string())
        .bind(email)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_email(email).await?.ok_or(DbError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, created_at, last_login_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> DbResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, created_at, last_login_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_last_login(&self, id: UserId) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = ?
            WHERE id = ?
            "#,
        )
        .bind(Utc::now().timestamp_millis())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
