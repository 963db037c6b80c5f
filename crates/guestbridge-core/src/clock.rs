//! Clock abstraction for deterministic event timestamps.

use chrono::{DateTime, Utc};

/// Abstraction over system time so change events can be timestamped
/// deterministically in tests.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
