//! SQLite repository implementations

mod token;
mod user;

pub use token::SqliteTokenRepository;
pub use user::SqliteUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: SqliteUserRepository,
    pub tokens: SqliteTokenRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: SqliteUserRepository::new(pool.clone()),
            tokens: SqliteTokenRepository::new(pool),
        }
    }
}
