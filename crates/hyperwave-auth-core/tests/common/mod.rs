//! Common test utilities for hyperwave-auth-core integration tests

pub mod mock_email;
pub mod mock_repos;

use std::sync::Arc;

use hyperwave_auth_core::{KeyProvider, ManualClock, RevocationRegistry, TokenService};

#[allow(unused_imports)]
pub use mock_email::RecordingEmailProvider;
#[allow(unused_imports)]
pub use mock_repos::{MockTokenRepository, MockUserRepository};

pub const SECRET: &str = "integration-test-secret-key-32-bytes-min";
pub const NOW: i64 = 1_700_000_000;

/// Token service on a manual clock, plus the clock
#[allow(dead_code)]
pub fn token_service() -> (Arc<TokenService>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at(NOW));
    let service = TokenService::new(
        Arc::new(KeyProvider::from_secret(SECRET)),
        Arc::new(RevocationRegistry::new()),
        clock.clone(),
    );
    (Arc::new(service), clock)
}
