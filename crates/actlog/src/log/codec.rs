// Wire codec for activity log lines
//
// TEAMMATESLOG|||SERVLET|||ACTION|||TO_SHOW|||ROLE[(M)]|||NAME|||GOOGLE_ID|||EMAIL|||MESSAGE|||URL|||ID[|||TIME_TAKEN]
//
// Fields are addressed by position. The separator is never escaped, so a
// value that contains it shifts every later field.

use actlog_error::{ActivityLogError, CodecError, CodecResult};
use tracing::{error, warn};

use crate::log::entry::ActivityLogEntry;
use crate::log::role::UserRole;
use crate::log::{FIELD_SEPARATOR, LOG_TAG, MASQUERADE_ROLE_SUFFIX, UNKNOWN};

/// Marker placed in the message of entries decoded from malformed lines
pub const MESSAGE_ERROR_LOG_MESSAGE_FORMAT: &str = "Log message format not as expected";

/// Field positions within a line, the tag being position 0
pub mod position {
    pub const SERVLET_NAME: usize = 1;
    pub const ACTION_NAME: usize = 2;
    pub const TO_SHOW: usize = 3;
    pub const USER_ROLE: usize = 4;
    pub const USER_NAME: usize = 5;
    pub const USER_GOOGLE_ID: usize = 6;
    pub const USER_EMAIL: usize = 7;
    pub const MESSAGE: usize = 8;
    pub const URL: usize = 9;
    pub const LOG_ID: usize = 10;
    pub const TIME_TAKEN: usize = 11;
}

/// Number of fields written by [`encode`]
pub const CANONICAL_FIELD_COUNT: usize = position::LOG_ID + 1;

/// Encode an entry into its canonical 11-field line
pub fn encode(entry: &ActivityLogEntry) -> String {
    let role = if entry.is_masquerade() {
        format!("{}{}", entry.role(), MASQUERADE_ROLE_SUFFIX)
    } else {
        entry.role().to_string()
    };
    let to_show = entry.to_show().to_string();

    let fields: [&str; CANONICAL_FIELD_COUNT] = [
        LOG_TAG,
        entry.servlet_name(),
        entry.action_name(),
        &to_show,
        &role,
        entry.user_name(),
        entry.user_google_id(),
        entry.user_email(),
        entry.message(),
        entry.url(),
        entry.id(),
    ];

    if let Some(pos) = fields[1..].iter().position(|f| f.contains(FIELD_SEPARATOR)) {
        warn!(
            position = pos + 1,
            id = entry.id(),
            "Field value contains the log separator; the line will not decode cleanly"
        );
    }

    fields.join(FIELD_SEPARATOR)
}

/// Append the elapsed-time field to an encoded line
pub fn append_time_taken(line: &str, time_taken: i64) -> String {
    format!("{}{}{}", line, FIELD_SEPARATOR, time_taken)
}

/// Encode an entry followed by its elapsed time
pub fn encode_with_time_taken(entry: &ActivityLogEntry) -> String {
    append_time_taken(&encode(entry), entry.time_taken())
}

/// Whether a raw sink line belongs to the activity log
pub fn is_activity_log_line(line: &str) -> bool {
    line.strip_prefix(LOG_TAG)
        .map_or(false, |rest| rest.starts_with(FIELD_SEPARATOR))
}

/// Decode a line logged at `time`, failing when fixed fields are missing
///
/// An unparsable elapsed time or role is not an error: it is logged and
/// replaced by 0 or [`UserRole::Unknown`].
pub fn try_decode(line: &str, time: i64) -> CodecResult<ActivityLogEntry> {
    let tokens: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

    if tokens.len() < CANONICAL_FIELD_COUNT {
        return Err(CodecError::TooFewFields {
            expected: CANONICAL_FIELD_COUNT,
            found: tokens.len(),
        });
    }
    let field = |position: usize| tokens[position];

    let role = field(position::USER_ROLE);
    let is_masquerade = role.contains(MASQUERADE_ROLE_SUFFIX);
    let role = decode_role(&role.replace(MASQUERADE_ROLE_SUFFIX, ""));

    Ok(ActivityLogEntry::builder(field(position::SERVLET_NAME), field(position::URL), time)
        .with_action_name(field(position::ACTION_NAME))
        .with_log_id(field(position::LOG_ID))
        .with_message(field(position::MESSAGE))
        .with_masquerade(is_masquerade)
        .with_user_email(field(position::USER_EMAIL))
        .with_user_google_id(field(position::USER_GOOGLE_ID))
        .with_user_name(field(position::USER_NAME))
        .with_user_role(role)
        .with_time_taken(decode_time_taken(&tokens, &tokens[position::TIME_TAKEN..]))
        .build())
}

/// Decode a line logged at `time`
///
/// Never fails: a line missing fixed fields yields a diagnostic entry whose
/// message carries the format error marker, the cause and the raw line.
pub fn decode(line: &str, time: i64) -> ActivityLogEntry {
    match try_decode(line, time) {
        Ok(entry) => entry,
        Err(err) => {
            warn!(code = %err.code(), "Failed to decode activity log line: {}", err);
            fallback_entry(line, time, &err)
        }
    }
}

/// Diagnostic entry standing in for a line that could not be decoded
pub fn fallback_entry(line: &str, time: i64, err: &CodecError) -> ActivityLogEntry {
    let message = format!(
        "<span class=\"text-danger\">{}</span><br>System Error: {}<br>{}",
        MESSAGE_ERROR_LOG_MESSAGE_FORMAT, err, line
    );
    ActivityLogEntry::builder(UNKNOWN, UNKNOWN, time)
        .with_message(message)
        .build()
}

fn decode_role(token: &str) -> UserRole {
    token.parse().unwrap_or_else(|err: CodecError| {
        warn!(code = %err.code(), "{}", err);
        UserRole::Unknown
    })
}

fn decode_time_taken(tokens: &[&str], extra: &[&str]) -> i64 {
    match extra {
        [] => 0,
        [time_taken] => match time_taken.trim().parse::<i64>() {
            Ok(millis) => millis,
            Err(_) => {
                let err = CodecError::InvalidTimeTaken(time_taken.to_string());
                error!(
                    code = %err.code(),
                    "{}: {:?}", MESSAGE_ERROR_LOG_MESSAGE_FORMAT, tokens
                );
                0
            }
        },
        _ => {
            warn!(
                fields = tokens.len(),
                "{}: more fields than expected, time taken ignored", MESSAGE_ERROR_LOG_MESSAGE_FORMAT
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LINE_WITHOUT_TIME_TAKEN: &str = "TEAMMATESLOG|||instructorHome|||Pageload|||true|||Instructor\
        |||UserName|||UserId|||UserEmail|||Message|||URL|||UserId20151019143729608";

    #[test]
    fn test_encode_default_entry() {
        let entry = ActivityLogEntry::builder("instructorHome", "URL", 10).build();
        assert_eq!(
            encode(&entry),
            "TEAMMATESLOG|||instructorHome|||instructorHome|||true|||Unknown|||Unknown|||Unknown\
             |||Unknown|||Unknown|||URL|||Unknown"
        );
    }

    #[test]
    fn test_encode_masquerade_entry() {
        let status = "<span class=\"text-danger\">Error. ActivityLogEntry object is not created \
                      for this servlet action.</span><br>Message";
        let entry = ActivityLogEntry::builder("instructorHome", "url.com", 10)
            .with_action_name("Servlet Action Failure")
            .with_user_role(UserRole::Instructor)
            .with_user_name("Joe")
            .with_user_google_id("GoogleIdA")
            .with_user_email("instructor@email.tmt")
            .with_message(status)
            .with_log_id("GoogleIdA%10")
            .with_time_taken(20)
            .with_masquerade(true)
            .build();

        let expected = format!(
            "TEAMMATESLOG|||instructorHome|||Servlet Action Failure|||true|||Instructor(M)|||Joe\
             |||GoogleIdA|||instructor@email.tmt|||{}|||url.com|||GoogleIdA%10",
            status
        );
        assert_eq!(encode(&entry), expected);
        assert_eq!(encode_with_time_taken(&entry), format!("{}|||20", expected));
    }

    #[test]
    fn test_fields_sit_at_their_positions() {
        let entry = ActivityLogEntry::builder("servlet", "url", 0)
            .with_action_name("action")
            .with_user_role(UserRole::Student)
            .with_user_name("name")
            .with_user_google_id("googleId")
            .with_user_email("email")
            .with_message("message")
            .with_log_id("id")
            .with_time_taken(9)
            .build();
        let line = encode_with_time_taken(&entry);
        let tokens: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

        assert_eq!(tokens[0], LOG_TAG);
        assert_eq!(tokens[position::SERVLET_NAME], "servlet");
        assert_eq!(tokens[position::ACTION_NAME], "action");
        assert_eq!(tokens[position::TO_SHOW], "true");
        assert_eq!(tokens[position::USER_ROLE], "Student");
        assert_eq!(tokens[position::USER_NAME], "name");
        assert_eq!(tokens[position::USER_GOOGLE_ID], "googleId");
        assert_eq!(tokens[position::USER_EMAIL], "email");
        assert_eq!(tokens[position::MESSAGE], "message");
        assert_eq!(tokens[position::URL], "url");
        assert_eq!(tokens[position::LOG_ID], "id");
        assert_eq!(tokens[position::TIME_TAKEN], "9");
        assert_eq!(tokens.len(), position::TIME_TAKEN + 1);
    }

    #[test]
    fn test_decode_with_time_taken() {
        let entry = decode(&append_time_taken(LINE_WITHOUT_TIME_TAKEN, 20), 5);
        assert_eq!(encode(&entry), LINE_WITHOUT_TIME_TAKEN);
        assert_eq!(entry.time_taken(), 20);
        assert_eq!(entry.time(), 5);
    }

    #[test]
    fn test_decode_without_time_taken() {
        let entry = decode(LINE_WITHOUT_TIME_TAKEN, 5);
        assert_eq!(encode(&entry), LINE_WITHOUT_TIME_TAKEN);
        assert_eq!(entry.time_taken(), 0);
    }

    #[test]
    fn test_decode_tolerates_bad_time_taken() {
        let line = format!("{}|||random", LINE_WITHOUT_TIME_TAKEN);
        let entry = try_decode(&line, 5).unwrap();
        assert_eq!(encode(&entry), LINE_WITHOUT_TIME_TAKEN);
        assert_eq!(entry.time_taken(), 0);

        let line = format!("{}||| 35 ", LINE_WITHOUT_TIME_TAKEN);
        assert_eq!(decode(&line, 5).time_taken(), 35);
    }

    #[test]
    fn test_decode_ignores_time_taken_after_extra_fields() {
        let line = format!("{}|||extra|||20", LINE_WITHOUT_TIME_TAKEN);
        let entry = decode(&line, 5);
        assert_eq!(entry.id(), "UserId20151019143729608");
        assert_eq!(entry.time_taken(), 0);
    }

    #[test]
    fn test_decode_malformed_line() {
        let err = try_decode("TEAMMATESLOG||RANDOM", 7).unwrap_err();
        assert_eq!(err, CodecError::TooFewFields { expected: 11, found: 1 });

        let entry = decode("TEAMMATESLOG||RANDOM", 7);
        assert!(entry.message().contains(MESSAGE_ERROR_LOG_MESSAGE_FORMAT));
        assert!(entry.message().contains("TEAMMATESLOG||RANDOM"));
        assert!(entry.message().contains("found 1"));
        assert_eq!(entry.servlet_name(), UNKNOWN);
        assert_eq!(entry.url(), UNKNOWN);
        assert_eq!(entry.time(), 7);
        assert!(encode(&entry).contains(MESSAGE_ERROR_LOG_MESSAGE_FORMAT));
    }

    #[test]
    fn test_decode_keeps_empty_trailing_field() {
        // Ten separators: the id is present but empty
        let line = "TEAMMATESLOG|||s|||a|||true|||Student|||n|||g|||e|||m|||u|||";
        let entry = try_decode(line, 0).unwrap();
        assert_eq!(entry.url(), "u");
        assert_eq!(entry.id(), UNKNOWN);
    }

    #[test]
    fn test_decode_masquerade() {
        let line = "TEAMMATESLOG|||instructorCommentsPage|||instructorCommentsPage|||true|||Instructor(M)\
                    |||david|||anotherGoogleId|||david@email.com|||View comments|||/page/instructorCommentsPage\
                    |||anotherGoogleId%20151019143729608";
        let entry = decode(line, 0);
        assert!(entry.is_masquerade());
        assert_eq!(entry.role(), &UserRole::Instructor);
        assert_eq!(entry.user_google_id(), "anotherGoogleId");
        assert_eq!(encode(&entry), line);
    }

    #[test]
    fn test_decode_unknown_role() {
        let line = "TEAMMATESLOG|||s|||a|||true|||Superuser|||n|||g|||e|||m|||u|||id";
        let entry = decode(line, 0);
        assert_eq!(entry.role(), &UserRole::Unknown);
        assert!(!entry.is_masquerade());
    }

    #[test]
    fn test_is_activity_log_line() {
        assert!(is_activity_log_line(LINE_WITHOUT_TIME_TAKEN));
        assert!(!is_activity_log_line("TEAMMATESLOGGER|||x"));
        assert!(!is_activity_log_line("GET /page/instructorHomePage 200"));
    }
}
