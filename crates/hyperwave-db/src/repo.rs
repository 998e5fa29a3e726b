//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use hyperwave_types::UserId;

use crate::error::DbResult;
use crate::models::UserRow;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user, or return the existing one with this email
    async fn create(&self, email: &str) -> DbResult<UserRow>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Find a user by ID
    async fn find_by_id(&self, id: UserId) -> DbResult<Option<UserRow>>;

    /// Stamp the user's last login time. Returns false if no row changed.
    async fn update_last_login(&self, id: UserId) -> DbResult<bool>;
}

/// Single-use token repository trait
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persist a token for `email`, replacing any row with the same token
    async fn store(&self, token: &str, email: &str, ttl_secs: i64) -> DbResult<()>;

    /// Check the token exists, belongs to `email` and has not expired.
    /// Expired rows are deleted as a side effect.
    async fn validate(&self, token: &str, email: &str) -> DbResult<bool>;

    /// Delete a token
    async fn invalidate(&self, token: &str) -> DbResult<()>;

    /// Atomically delete the token if it belongs to `email`. Returns true only
    /// for the single caller that removed an unexpired row; an expired row is
    /// removed too but reported as false.
    async fn consume(&self, token: &str, email: &str) -> DbResult<bool>;

    /// Delete all expired tokens
    async fn delete_expired(&self) -> DbResult<u64>;
}
