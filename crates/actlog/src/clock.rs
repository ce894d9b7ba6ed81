// Clock sources
//
// Entry creation times come from a clock source so that generated ids are
// reproducible in tests and replays.

use std::fmt::Debug;

use chrono::Utc;

/// A source of wall-clock time in epoch milliseconds
pub trait ClockSource: Send + Sync + Debug {
    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// A clock that reads the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock
    pub fn new() -> Self {
        Self
    }
}

impl ClockSource for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock frozen at a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    millis: i64,
}

impl FixedClock {
    /// Create a clock that always reports `millis`
    pub fn new(millis: i64) -> Self {
        Self { millis }
    }
}

impl ClockSource for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis
    }
}
