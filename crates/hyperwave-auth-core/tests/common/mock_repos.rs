//! Mock repositories for testing
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use hyperwave_db::{DbError, DbResult, TokenRepository, TokenRow, UserRepository, UserRow};
use hyperwave_types::UserId;

/// In-memory user repository for testing
#[derive(Default, Clone)]
pub struct MockUserRepository {
    by_email: Arc<DashMap<String, UserRow>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user, as an account deletion would
    pub fn delete(&self, email: &str) {
        self.by_email.remove(email);
    }

    pub fn get(&self, email: &str) -> Option<UserRow> {
        self.by_email.get(email).map(|r| r.value().clone())
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, email: &str) -> DbResult<UserRow> {
        let now = Utc::now().timestamp_millis();
        let row = self
            .by_email
            .entry(email.to_string())
            .or_insert_with(|| UserRow {
                id: UserId::new().to_string(),
                email: email.to_string(),
                created_at: now,
                last_login_at: Some(now),
            });
        Ok(row.value().clone())
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self.get(email))
    }

    async fn find_by_id(&self, id: UserId) -> DbResult<Option<UserRow>> {
        let id = id.to_string();
        Ok(self
            .by_email
            .iter()
            .find(|r| r.value().id == id)
            .map(|r| r.value().clone()))
    }

    async fn update_last_login(&self, id: UserId) -> DbResult<bool> {
        let id = id.to_string();
        let now = Utc::now().timestamp_millis();
        for mut row in self.by_email.iter_mut() {
            if row.id == id {
                row.last_login_at = Some(now);
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// In-memory single-use token repository for testing
#[derive(Default, Clone)]
pub struct MockTokenRepository {
    tokens: Arc<DashMap<String, TokenRow>>,
    fail: Arc<AtomicBool>,
}

impl MockTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with a database error
    pub fn fail_calls(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn recover_calls(&self) {
        self.fail.store(false, Ordering::SeqCst);
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    pub fn get(&self, token: &str) -> Option<TokenRow> {
        self.tokens.get(token).map(|r| r.value().clone())
    }

    /// Push a stored token's expiry into the past
    pub fn expire(&self, token: &str) {
        if let Some(mut row) = self.tokens.get_mut(token) {
            row.expires_at = Utc::now().timestamp_millis() - 1_000;
        }
    }

    fn check(&self) -> DbResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DbError::InvalidRow("mock failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn store(&self, token: &str, email: &str, ttl_secs: i64) -> DbResult<()> {
        self.check()?;
        self.tokens.insert(
            token.to_string(),
            TokenRow {
                token: token.to_string(),
                email: email.to_string(),
                expires_at: Utc::now().timestamp_millis() + ttl_secs * 1000,
            },
        );
        Ok(())
    }

    async fn validate(&self, token: &str, email: &str) -> DbResult<bool> {
        self.check()?;
        let Some(row) = self.get(token) else {
            return Ok(false);
        };
        if row.email != email {
            return Ok(false);
        }
        if row.is_expired_at(Utc::now().timestamp_millis()) {
            self.tokens.remove(token);
            return Ok(false);
        }
        Ok(true)
    }

    async fn invalidate(&self, token: &str) -> DbResult<()> {
        self.check()?;
        self.tokens.remove(token);
        Ok(())
    }

    async fn consume(&self, token: &str, email: &str) -> DbResult<bool> {
        self.check()?;
        let Some((_, row)) = self.tokens.remove_if(token, |_, row| row.email == email) else {
            return Ok(false);
        };
        Ok(!row.is_expired_at(Utc::now().timestamp_millis()))
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        self.check()?;
        let now = Utc::now().timestamp_millis();
        let before = self.tokens.len();
        self.tokens.retain(|_, row| !row.is_expired_at(now));
        Ok((before - self.tokens.len()) as u64)
    }
}
