//! SQLite single-use token repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::TokenRow;
use crate::repo::TokenRepository;

/// SQLite token repository
#[derive(Clone)]
pub struct SqliteTokenRepository {
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    /// Create a new token repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a raw token row
    pub async fn find(&self, token: &str) -> DbResult<Option<TokenRow>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT token, email, expires_at
            FROM tokens
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    async fn store(&self, token: &str, email: &str, ttl_secs: i64) -> DbResult<()> {
        let expires_at = Utc::now().timestamp_millis() + ttl_secs * 1000;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO tokens (token, email, expires_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(token)
        .bind(email)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn validate(&self, token: &str, email: &str) -> DbResult<bool> {
        let Some(row) = self.find(token).await? else {
            return Ok(false);
        };

        if row.email != email {
            tracing::debug!("Stored token belongs to a different email");
            return Ok(false);
        }

        if row.is_expired_at(Utc::now().timestamp_millis()) {
            tracing::debug!("Stored token expired, removing");
            self.invalidate(token).await?;
            return Ok(false);
        }

        Ok(true)
    }

    async fn invalidate(&self, token: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn consume(&self, token: &str, email: &str) -> DbResult<bool> {
        let expires_at = sqlx::query_scalar::<_, i64>(
            r#"
            DELETE FROM tokens
            WHERE token = ? AND email = ?
            RETURNING expires_at
            "#,
        )
        .bind(token)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match expires_at {
            Some(expires_at) if expires_at < Utc::now().timestamp_millis() => {
                tracing::debug!("Consumed token had expired");
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM tokens WHERE expires_at < ?")
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
