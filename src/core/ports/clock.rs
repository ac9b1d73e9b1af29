//! Time source port

use chrono::{DateTime, Utc};

/// Source of the current time
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
