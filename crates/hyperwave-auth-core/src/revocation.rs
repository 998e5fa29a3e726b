//! In-memory token revocation registry

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use dashmap::DashSet;

/// Set of revoked tokens.
///
/// Without a capacity the set grows until [`reset`](Self::reset). With one,
/// the oldest revocation is dropped once the set is full.
#[derive(Debug, Default)]
pub struct RevocationRegistry {
    revoked: DashSet<String>,
    order: Mutex<VecDeque<String>>,
    capacity: Option<NonZeroUsize>,
}

impl RevocationRegistry {
    /// Unbounded registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding at most `capacity` tokens
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            revoked: DashSet::with_capacity(capacity.get()),
            order: Mutex::new(VecDeque::with_capacity(capacity.get())),
            capacity: Some(capacity),
        }
    }

    /// Revoke a token. Revoking it again is a no-op.
    pub fn revoke(&self, token: &str) {
        let Some(capacity) = self.capacity else {
            self.revoked.insert(token.to_string());
            return;
        };

        // Hold the queue lock across the insert so set and queue stay in step with reset
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.revoked.insert(token.to_string()) {
            return;
        }
        order.push_back(token.to_string());
        while order.len() > capacity.get() {
            if let Some(oldest) = order.pop_front() {
                self.revoked.remove(&oldest);
                tracing::debug!(capacity = capacity.get(), "Evicted oldest revoked token");
            }
        }
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.revoked.contains(token)
    }

    /// Forget every revocation
    pub fn reset(&self) {
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        order.clear();
        self.revoked.clear();
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}
