//! Time source for token issuance and validation

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Wall clock abstraction
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current time as whole seconds since the unix epoch
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock with one-second resolution.
///
/// Shared through an `Arc`, so a test can move time forward while a
/// [`TokenService`](crate::TokenService) holds the same clock.
#[derive(Debug)]
pub struct ManualClock {
    secs: AtomicI64,
}

impl ManualClock {
    /// Clock frozen at `secs` since the unix epoch
    pub fn at(secs: i64) -> Self {
        Self {
            secs: AtomicI64::new(secs),
        }
    }

    /// Clock frozen at the current system time
    pub fn starting_now() -> Self {
        Self::at(Utc::now().timestamp())
    }

    pub fn set(&self, secs: i64) {
        self.secs.store(secs, Ordering::SeqCst);
    }

    /// Move the clock by `secs` (negative moves it back)
    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.secs.load(Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn unix_timestamp(&self) -> i64 {
        self.secs.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::at(1_700_000_000);
        assert_eq!(clock.unix_timestamp(), 1_700_000_000);

        clock.advance(901);
        assert_eq!(clock.unix_timestamp(), 1_700_000_901);
        assert_eq!(clock.now().timestamp(), 1_700_000_901);

        clock.advance(-1);
        assert_eq!(clock.unix_timestamp(), 1_700_000_900);
    }

    #[test]
    fn test_system_clock_is_current() {
        let before = Utc::now().timestamp();
        let now = SystemClock.unix_timestamp();
        assert!(now >= before && now <= before + 1);
    }
}
