// Time utilities for the activity log
//
// Log ids and displayed times are rendered in the administrative timezone,
// never in the caller's local timezone.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

/// Pattern of the timestamp embedded in log ids (yyyyMMddHHmmssSSS)
pub const LOG_ID_TIME_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// Pattern of log times shown to administrators (dd-MM-yyyy HH:mm:ss)
pub const DISPLAY_TIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Convert epoch milliseconds to a time in the given offset
pub fn millis_to_datetime(millis: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    match Utc.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) => dt.with_timezone(&offset),
        _ => DateTime::<Utc>::default().with_timezone(&offset), // Fall back to the epoch
    }
}

/// Timestamp part of a log id
pub fn format_log_id_time(millis: i64, offset: FixedOffset) -> String {
    millis_to_datetime(millis, offset).format(LOG_ID_TIME_FORMAT).to_string()
}

/// Log time as displayed on the admin dashboard
pub fn format_display_time(millis: i64, offset: FixedOffset) -> String {
    millis_to_datetime(millis, offset).format(DISPLAY_TIME_FORMAT).to_string()
}
