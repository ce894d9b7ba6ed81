// Configuration for the activity log
//
// Page prefixes, request parameter names and the administrative timezone used
// when resolving identities and generating ids.

use std::path::Path;

use actlog_error::{ConfigError, ConfigResult};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Configuration for identity resolution and id generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLogConfig {
    /// Offset of the administrative timezone from UTC, in minutes
    pub admin_utc_offset_minutes: i32,

    /// URL prefix of automated (system-triggered) actions
    pub auto_page_prefix: String,

    /// Servlet name prefix of student pages, compared case-insensitively
    pub student_page_prefix: String,

    /// Servlet name prefix of instructor pages, compared case-insensitively
    pub instructor_page_prefix: String,

    /// URIs of instructor pages whose names lack the instructor prefix
    pub instructor_page_aliases: Vec<String>,

    /// Request parameter holding the course id of a registration key
    pub course_id_param: String,

    /// Request parameter holding the student email of a registration key
    pub student_email_param: String,

    /// Parameter naming the acting user in displayed URLs
    pub user_id_param: String,

    /// Email suffix that marks an entry as testing data
    pub testing_data_email_suffix: String,
}

impl Default for ActivityLogConfig {
    fn default() -> Self {
        Self {
            admin_utc_offset_minutes: 8 * 60, // UTC+08:00
            auto_page_prefix: "/auto/".to_string(),
            student_page_prefix: "student".to_string(),
            instructor_page_prefix: "instructor".to_string(),
            instructor_page_aliases: vec!["/page/feedbackSessionStatsPage".to_string()],
            course_id_param: "courseid".to_string(),
            student_email_param: "studentemail".to_string(),
            user_id_param: "user".to_string(),
            testing_data_email_suffix: ".tmt".to_string(),
        }
    }
}

impl ActivityLogConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Set the administrative timezone offset
    pub fn with_admin_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.admin_utc_offset_minutes = minutes;
        self
    }

    /// Set the automated action URL prefix
    pub fn with_auto_page_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auto_page_prefix = prefix.into();
        self
    }

    /// Set the student page prefix
    pub fn with_student_page_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.student_page_prefix = prefix.into();
        self
    }

    /// Set the instructor page prefix
    pub fn with_instructor_page_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.instructor_page_prefix = prefix.into();
        self
    }

    /// Add an instructor page alias
    pub fn with_instructor_page_alias(mut self, uri: impl Into<String>) -> Self {
        self.instructor_page_aliases.push(uri.into());
        self
    }

    /// Set the email suffix that marks testing data
    pub fn with_testing_data_email_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.testing_data_email_suffix = suffix.into();
        self
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> ConfigResult<()> {
        self.admin_offset()?;
        if self.auto_page_prefix.is_empty() {
            return Err(ConfigError::EmptyValue("auto_page_prefix"));
        }
        if self.student_page_prefix.is_empty() {
            return Err(ConfigError::EmptyValue("student_page_prefix"));
        }
        if self.instructor_page_prefix.is_empty() {
            return Err(ConfigError::EmptyValue("instructor_page_prefix"));
        }
        Ok(())
    }

    /// The administrative timezone as a fixed offset
    pub fn admin_offset(&self) -> ConfigResult<FixedOffset> {
        self.admin_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidUtcOffset(self.admin_utc_offset_minutes))
    }
}
