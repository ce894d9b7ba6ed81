// Activity log system
//
// This module provides the entry model, the wire codec and the machinery that
// derives an entry from the context of a request.

// Core modules
pub mod role;
pub mod entry;
pub mod codec;
pub mod time_utils;

// Identity and id generation
pub mod request;
pub mod identity;
pub mod id;
pub mod generator;

// Read side
pub mod filter;
pub mod view;

// Re-export core types
pub use codec::{append_time_taken, decode, encode, encode_with_time_taken, is_activity_log_line, try_decode};
pub use entry::{ActivityLogEntry, ActivityLogEntryBuilder};
pub use filter::LogFilter;
pub use generator::ActivityLogGenerator;
pub use id::LogIdGenerator;
pub use identity::{AuthState, IdentityResolver, ResolvedIdentity};
pub use request::{AccountInfo, ActionContext, ActionFailure, CurrentUser, ErrorReport, RequestParams, UnregisteredStudent};
pub use role::UserRole;
pub use view::{highlight, keyword_matcher, LogEntryView, TimeTakenLevel};

/// Literal that opens every activity log line
pub const LOG_TAG: &str = "TEAMMATESLOG";

/// Separator between the fields of a line; never escaped
pub const FIELD_SEPARATOR: &str = "|||";

/// Joins the parts of a log id
pub const FIELD_CONNECTOR: &str = "%";

/// Placeholder for every absent textual field
pub const UNKNOWN: &str = "Unknown";

/// Appended to the role field of a masquerading entry
pub const MASQUERADE_ROLE_SUFFIX: &str = "(M)";

/// Google id recorded for callers that are not logged in
pub const AUTH_NOT_LOGIN: &str = "Unknown";

/// Action name of servlet action failures
pub const ACTION_RESULT_FAILURE: &str = "Servlet Action Failure";

/// Action name of system error reports
pub const ACTION_RESULT_SYSTEM_ERROR_REPORT: &str = "System Error Report";
