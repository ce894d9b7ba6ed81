// Activity log library
//
// Turns the execution context of a request into a single delimited log line
// and reconstructs entries from stored lines for inspection.

pub mod clock;
pub mod config;
pub mod log;

pub use clock::{ClockSource, FixedClock, SystemClock};
pub use config::ActivityLogConfig;
pub use log::{
    decode, encode, ActionContext, ActivityLogEntry, ActivityLogEntryBuilder, ActivityLogGenerator,
    LogFilter, UserRole,
};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
