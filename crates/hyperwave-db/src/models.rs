//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.
//! Timestamps are stored as unix milliseconds.

use chrono::{DateTime, TimeZone, Utc};
use hyperwave_types::{User, UserId};
use sqlx::FromRow;

use crate::error::{DbError, DbResult};

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub created_at: i64,
    pub last_login_at: Option<i64>,
}

impl UserRow {
    /// Parse the stored ID
    pub fn user_id(&self) -> DbResult<UserId> {
        UserId::parse(&self.id).map_err(|e| DbError::InvalidRow(format!("user id {}: {e}", self.id)))
    }

    /// Convert into the shared domain type
    pub fn into_user(self) -> DbResult<User> {
        Ok(User {
            id: self.user_id()?,
            created_at: millis_to_datetime(self.created_at)?,
            last_login_at: self.last_login_at.map(millis_to_datetime).transpose()?,
            email: self.email,
        })
    }
}

/// Single-use token row (magic links)
#[derive(Debug, Clone, FromRow)]
pub struct TokenRow {
    pub token: String,
    pub email: String,
    pub expires_at: i64,
}

impl TokenRow {
    /// Whether the row's TTL has elapsed at `now_millis`
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.expires_at < now_millis
    }
}

fn millis_to_datetime(millis: i64) -> DbResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| DbError::InvalidRow(format!("timestamp out of range: {millis}")))
}
