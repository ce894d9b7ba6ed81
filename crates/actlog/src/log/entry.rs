// Activity log entry and its builder

use serde::{Deserialize, Serialize};

use crate::log::role::UserRole;
use crate::log::UNKNOWN;

/// One record of the activity log
///
/// Entries are immutable once built. Every textual field holds
/// [`UNKNOWN`] when no value was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    id: String,
    time: i64,
    servlet_name: String,
    action_name: String,
    to_show: bool,
    role: UserRole,
    is_masquerade: bool,
    user_name: String,
    user_google_id: String,
    user_email: String,
    message: String,
    url: String,
    time_taken: i64,
}

impl ActivityLogEntry {
    /// Start building an entry for `servlet_name` at `url`, created at `time`
    pub fn builder(
        servlet_name: impl Into<String>,
        url: impl Into<String>,
        time: i64,
    ) -> ActivityLogEntryBuilder {
        ActivityLogEntryBuilder::new(servlet_name, url, time)
    }

    /// The unique id of this record
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time in epoch milliseconds
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn servlet_name(&self) -> &str {
        &self.servlet_name
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    /// Legacy display flag, always `true` for generated entries
    pub fn to_show(&self) -> bool {
        self.to_show
    }

    /// The bare role, without the masquerade marker
    pub fn role(&self) -> &UserRole {
        &self.role
    }

    pub fn is_masquerade(&self) -> bool {
        self.is_masquerade
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn user_google_id(&self) -> &str {
        &self.user_google_id
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    /// Outcome message, may contain HTML
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Elapsed time of the action in milliseconds, 0 when unknown
    pub fn time_taken(&self) -> i64 {
        self.time_taken
    }

    /// Whether the entry was produced by a test account
    pub fn is_testing_data(&self, email_suffix: &str) -> bool {
        !email_suffix.is_empty() && self.user_email.ends_with(email_suffix)
    }
}

/// Builder for [`ActivityLogEntry`]
///
/// Unset or empty textual values are replaced by [`UNKNOWN`] when the entry is
/// built. The action name falls back to the servlet name.
#[derive(Debug, Clone, Default)]
pub struct ActivityLogEntryBuilder {
    // Required
    servlet_name: String,
    url: String,
    time: i64,

    // Optional
    action_name: Option<String>,
    role: Option<UserRole>,
    is_masquerade: bool,
    user_name: Option<String>,
    user_google_id: Option<String>,
    user_email: Option<String>,
    message: Option<String>,
    id: Option<String>,
    time_taken: i64,
}

impl ActivityLogEntryBuilder {
    /// Create a builder with the required values
    pub fn new(servlet_name: impl Into<String>, url: impl Into<String>, time: i64) -> Self {
        Self {
            servlet_name: servlet_name.into(),
            url: url.into(),
            time,
            ..Default::default()
        }
    }

    pub fn with_action_name(mut self, action_name: impl Into<String>) -> Self {
        self.action_name = Some(action_name.into());
        self
    }

    pub fn with_user_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_masquerade(mut self, is_masquerade: bool) -> Self {
        self.is_masquerade = is_masquerade;
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    pub fn with_user_google_id(mut self, google_id: impl Into<String>) -> Self {
        self.user_google_id = Some(google_id.into());
        self
    }

    pub fn with_user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_log_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_time_taken(mut self, millis: i64) -> Self {
        self.time_taken = millis;
        self
    }

    /// Servlet name as given, before normalization
    pub fn servlet_name(&self) -> &str {
        &self.servlet_name
    }

    /// Creation time of the entry being built
    pub fn time(&self) -> i64 {
        self.time
    }

    /// Build the immutable entry
    pub fn build(self) -> ActivityLogEntry {
        let servlet_name = or_unknown(Some(self.servlet_name));
        let action_name = match self.action_name.filter(|a| !a.is_empty()) {
            Some(action_name) => action_name,
            None => servlet_name.clone(),
        };

        ActivityLogEntry {
            id: or_unknown(self.id),
            time: self.time,
            servlet_name,
            action_name,
            to_show: true,
            role: self.role.unwrap_or_default(),
            is_masquerade: self.is_masquerade,
            user_name: or_unknown(self.user_name),
            user_google_id: or_unknown(self.user_google_id),
            user_email: or_unknown(self.user_email),
            message: or_unknown(self.message),
            url: or_unknown(Some(self.url)),
            time_taken: self.time_taken,
        }
    }
}

fn or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN.to_string(),
    }
}
