//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// A stored row could not be mapped to a domain type
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

/// Result alias for repository operations
pub type DbResult<T> = Result<T, DbError>;
