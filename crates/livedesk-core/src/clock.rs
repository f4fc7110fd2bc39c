//! Wall-clock abstraction.
//!
//! The counter engine's day-boundary and scheduling logic is driven by a
//! `Clock` so tests can pin time to a fixed local instant instead of
//! sleeping through real delays.

use chrono::{DateTime, Local};

/// Source of the current local time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Local>;

    /// Current time as epoch milliseconds.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Production clock reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
