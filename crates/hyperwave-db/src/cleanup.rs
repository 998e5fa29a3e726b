//! Periodic sweep of expired single-use tokens

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::repo::TokenRepository;

/// Default sweep interval (15 minutes)
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Run one sweep, logging instead of failing
pub async fn cleanup_expired_tokens<T: TokenRepository + ?Sized>(repo: &T) -> u64 {
    match repo.delete_expired().await {
        Ok(0) => 0,
        Ok(count) => {
            tracing::info!(count, "Cleaned up expired tokens");
            count
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to cleanup expired tokens");
            0
        }
    }
}

/// Spawn a background task sweeping expired tokens every `every`.
/// The first sweep runs one interval after spawning. Abort the handle to stop.
/// A zero interval falls back to [`DEFAULT_CLEANUP_INTERVAL`].
pub fn spawn_token_cleanup<T>(repo: Arc<T>, every: Duration) -> JoinHandle<()>
where
    T: TokenRepository + 'static,
{
    let every = if every.is_zero() {
        tracing::warn!("Zero token cleanup interval, using the default");
        DEFAULT_CLEANUP_INTERVAL
    } else {
        every
    };
    tracing::debug!(interval_secs = every.as_secs(), "Token cleanup scheduler started");

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            cleanup_expired_tokens(repo.as_ref()).await;
        }
    })
}
