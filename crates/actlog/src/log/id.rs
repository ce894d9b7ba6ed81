// Log id generation
//
// Ids are `<owner>%<yyyyMMddHHmmssSSS>` with the timestamp in the
// administrative timezone, e.g. `bamboo3250%20151103170618465`, or
// `<studentEmail>%<courseId>%<timestamp>` for students joining by key.

use chrono::FixedOffset;

use crate::log::identity::AuthState;
use crate::log::request::RequestParams;
use crate::log::role::UserRole;
use crate::log::time_utils::format_log_id_time;
use crate::log::{AUTH_NOT_LOGIN, FIELD_CONNECTOR};

/// Generates record ids for each authentication state
#[derive(Debug, Clone)]
pub struct LogIdGenerator {
    offset: FixedOffset,
    course_id_param: String,
    student_email_param: String,
}

impl LogIdGenerator {
    /// Create a generator stamping ids in `offset`
    pub fn new(
        offset: FixedOffset,
        course_id_param: impl Into<String>,
        student_email_param: impl Into<String>,
    ) -> Self {
        Self {
            offset,
            course_id_param: course_id_param.into(),
            student_email_param: student_email_param.into(),
        }
    }

    /// Id of a record created at `time` under `auth`
    pub fn generate(&self, auth: &AuthState, params: &RequestParams, time: i64) -> String {
        match auth {
            AuthState::Automated => self.for_automated_action(time),
            AuthState::Anonymous => self.without_google_id(params, time),
            AuthState::Authenticated { google_id } => self.with_google_id(google_id, time),
        }
    }

    /// `Auto%<timestamp>`
    pub fn for_automated_action(&self, time: i64) -> String {
        self.join(&[UserRole::Auto.kind()], time)
    }

    /// `<googleId>%<timestamp>`
    pub fn with_google_id(&self, google_id: &str, time: i64) -> String {
        self.join(&[google_id], time)
    }

    /// Id of an anonymous request, keyed by registration parameters when present
    pub fn without_google_id(&self, params: &RequestParams, time: i64) -> String {
        let course_id = params.first(&self.course_id_param);
        let student_email = params.first(&self.student_email_param);
        match (student_email, course_id) {
            (Some(email), Some(course_id)) => self.join(&[email, course_id], time),
            _ => self.join(&[AUTH_NOT_LOGIN], time),
        }
    }

    fn join(&self, parts: &[&str], time: i64) -> String {
        let timestamp = format_log_id_time(time, self.offset);
        let mut id = parts.join(FIELD_CONNECTOR);
        id.push_str(FIELD_CONNECTOR);
        id.push_str(&timestamp);
        id
    }
}
