// Log filtering
// Selects decoded entries for the admin dashboard

use regex::Regex;

use crate::log::entry::ActivityLogEntry;
use crate::log::role::UserRole;
use crate::log::view::keyword_matcher;

/// Filter for decoded activity log entries
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Filter by role kind; `Unregistered` matches any course
    pub roles: Option<Vec<UserRole>>,
    /// Filter by google id, email or name, case-insensitive
    pub persons: Option<Vec<String>>,
    /// Filter by start time, inclusive
    pub start_time: Option<i64>,
    /// Filter by end time, inclusive
    pub end_time: Option<i64>,
    /// Case-insensitive text the message must contain
    pub search_text: Option<String>,
    /// Entries whose email ends with this suffix are dropped
    pub exclude_testing_data: Option<String>,
    /// Maximum number of entries to return
    pub limit: Option<usize>,
}

impl LogFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role to the filter
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.roles.get_or_insert_with(Vec::new).push(role);
        self
    }

    /// Add a person to the filter
    pub fn with_person(mut self, person: impl Into<String>) -> Self {
        self.persons.get_or_insert_with(Vec::new).push(person.into());
        self
    }

    /// Set the time range for the filter
    pub fn with_time_range(mut self, start: i64, end: i64) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Drop entries of test accounts identified by `email_suffix`
    pub fn excluding_testing_data(mut self, email_suffix: impl Into<String>) -> Self {
        self.exclude_testing_data = Some(email_suffix.into());
        self
    }

    /// Set the maximum number of entries to return
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Keywords to highlight in the messages of matching entries
    pub fn highlight_keywords(&self) -> Vec<String> {
        self.search_text
            .iter()
            .filter(|text| !text.trim().is_empty())
            .map(|text| text.trim().to_string())
            .collect()
    }

    /// Check if an entry matches this filter
    pub fn matches(&self, entry: &ActivityLogEntry) -> bool {
        self.matches_with(entry, self.search_matcher().as_ref())
    }

    /// Apply this filter to a collection of entries
    pub fn apply(&self, entries: &[ActivityLogEntry]) -> Vec<ActivityLogEntry> {
        let search = self.search_matcher();
        let matching = entries
            .iter()
            .filter(|entry| self.matches_with(entry, search.as_ref()))
            .cloned();
        match self.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }

    fn search_matcher(&self) -> Option<Regex> {
        self.search_text.as_deref().and_then(keyword_matcher)
    }

    fn matches_with(&self, entry: &ActivityLogEntry, search: Option<&Regex>) -> bool {
        if let Some(roles) = &self.roles {
            if !roles.iter().any(|role| role.same_kind(entry.role())) {
                return false;
            }
        }

        if let Some(persons) = &self.persons {
            let identifies = |person: &String| {
                [entry.user_google_id(), entry.user_email(), entry.user_name()]
                    .iter()
                    .any(|value| value.eq_ignore_ascii_case(person))
            };
            if !persons.iter().any(identifies) {
                return false;
            }
        }

        if let Some(start) = self.start_time {
            if entry.time() < start {
                return false;
            }
        }

        if let Some(end) = self.end_time {
            if entry.time() > end {
                return false;
            }
        }

        if let Some(search) = search {
            if !search.is_match(entry.message()) {
                return false;
            }
        }

        if let Some(suffix) = &self.exclude_testing_data {
            if entry.is_testing_data(suffix) {
                return false;
            }
        }

        true
    }
}
