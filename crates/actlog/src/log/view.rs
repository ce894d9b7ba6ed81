// Read-side helpers for decoded entries
//
// Values the admin dashboard derives from an entry. Producing the markup
// itself is left to the dashboard.

use std::ops::Range;

use chrono::{Offset, Utc};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::config::ActivityLogConfig;
use crate::log::entry::ActivityLogEntry;
use crate::log::role::UserRole;
use crate::log::time_utils::format_display_time;
use crate::log::{
    ACTION_RESULT_FAILURE, ACTION_RESULT_SYSTEM_ERROR_REPORT, AUTH_NOT_LOGIN, MASQUERADE_ROLE_SUFFIX, UNKNOWN,
};

pub const KEYWORD_HIGHLIGHT_FRONT: &str = "<mark>";
pub const KEYWORD_HIGHLIGHT_BACK: &str = "</mark>";
pub const ACTION_FAILURE_HIGHLIGHT_FRONT: &str = "<span class=\"text-danger\"><strong>";
pub const ACTION_FAILURE_HIGHLIGHT_BACK: &str = "</strong></span>";

pub const STUDENT_HOME_PAGE: &str = "/page/studentHomePage";
pub const INSTRUCTOR_HOME_PAGE: &str = "/page/instructorHomePage";

/// Case-insensitive matcher for a search keyword, `None` when it is blank
///
/// Highlighting and [`LogFilter`](crate::log::LogFilter) both match through
/// this so an entry selected by a keyword always shows it highlighted.
pub fn keyword_matcher(keyword: &str) -> Option<Regex> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
        .map_err(|err| warn!(keyword, "Search keyword cannot be matched: {}", err))
        .ok()
}

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]*>").expect("markup tag pattern is valid"));

/// Wrap every case-insensitive occurrence of `keywords` in `front`/`back`
///
/// Only text outside markup tags is matched, so neither the message's own
/// markup nor earlier highlight markers get wrapped. Overlapping matches are
/// merged into a single wrap, and a match already enclosed in `front`/`back`
/// is left alone: applying the same highlight twice changes nothing.
pub fn highlight<S: AsRef<str>>(original: &str, keywords: &[S], front: &str, back: &str) -> String {
    let tags: Vec<Range<usize>> = MARKUP_TAG.find_iter(original).map(|tag| tag.range()).collect();
    let in_markup = |found: &Range<usize>| tags.iter().any(|tag| found.start < tag.end && tag.start < found.end);

    let mut ranges: Vec<Range<usize>> = keywords
        .iter()
        .filter_map(|keyword| keyword_matcher(keyword.as_ref()))
        .flat_map(|matcher| matcher.find_iter(original).map(|found| found.range()).collect::<Vec<_>>())
        .filter(|found| !found.is_empty() && !in_markup(found))
        .collect();
    ranges.sort_unstable_by_key(|found| (found.start, found.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for found in ranges {
        match merged.last_mut() {
            Some(last) if found.start < last.end => last.end = last.end.max(found.end),
            _ => merged.push(found),
        }
    }

    let mut highlighted = String::with_capacity(original.len() + merged.len() * (front.len() + back.len()));
    let mut cursor = 0;
    for Range { start, end } in merged {
        if original[..start].ends_with(front) && original[end..].starts_with(back) {
            continue;
        }
        highlighted.push_str(&original[cursor..start]);
        highlighted.push_str(front);
        highlighted.push_str(&original[start..end]);
        highlighted.push_str(back);
        cursor = end;
    }
    highlighted.push_str(&original[cursor..]);
    highlighted
}

/// Add `key=value` to `url` unless the parameter is already present
pub fn add_param_to_url(url: &str, key: &str, value: &str) -> String {
    let param = format!("{}=", key);
    let has_param = url
        .split_once('?')
        .map_or(false, |(_, query)| query.split('&').any(|pair| pair.starts_with(&param)));
    if has_param {
        return url.to_string();
    }
    let joiner = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}{}", url, joiner, param, value)
}

/// How slow an action was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeTakenLevel {
    Normal,
    /// 10 to 20 seconds
    Warning,
    /// Over 20 and up to 60 seconds
    Danger,
}

impl TimeTakenLevel {
    const WARNING_LOWER_MS: i64 = 10_000;
    const WARNING_UPPER_MS: i64 = 20_000;
    const DANGER_UPPER_MS: i64 = 60_000;

    /// Level of an action that took `millis`
    pub fn of(millis: i64) -> Self {
        if (Self::WARNING_LOWER_MS..=Self::WARNING_UPPER_MS).contains(&millis) {
            TimeTakenLevel::Warning
        } else if millis > Self::WARNING_UPPER_MS && millis <= Self::DANGER_UPPER_MS {
            TimeTakenLevel::Danger
        } else {
            TimeTakenLevel::Normal
        }
    }
}

/// Dashboard view of one decoded entry
#[derive(Debug, Clone)]
pub struct LogEntryView<'a> {
    entry: &'a ActivityLogEntry,
    config: &'a ActivityLogConfig,
    keywords: Vec<String>,
}

impl<'a> LogEntryView<'a> {
    pub fn new(entry: &'a ActivityLogEntry, config: &'a ActivityLogConfig) -> Self {
        Self {
            entry,
            config,
            keywords: Vec::new(),
        }
    }

    /// Keywords to mark in the displayed message
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn entry(&self) -> &ActivityLogEntry {
        self.entry
    }

    /// Best available identification of the user: google id, email or name
    pub fn user_identity(&self) -> &str {
        let google_id = self.entry.user_google_id();
        if google_id != AUTH_NOT_LOGIN && google_id != UNKNOWN {
            return google_id;
        }
        let email = self.entry.user_email();
        if email != UNKNOWN {
            return email;
        }
        let name = self.entry.user_name();
        if name != UNKNOWN {
            return name;
        }
        ""
    }

    /// Home page of the user, for student and instructor entries
    pub fn user_home_link(&self) -> Option<String> {
        let page = match self.entry.role() {
            UserRole::Student => STUDENT_HOME_PAGE,
            UserRole::Instructor => INSTRUCTOR_HOME_PAGE,
            _ => return None,
        };
        Some(add_param_to_url(page, &self.config.user_id_param, self.entry.user_google_id()))
    }

    /// Action URL that reopens the page as the logged user
    pub fn displayed_action_url(&self) -> String {
        add_param_to_url(self.entry.url(), &self.config.user_id_param, self.entry.user_google_id())
    }

    /// Log time in the administrative timezone
    pub fn displayed_log_time(&self) -> String {
        let offset = self.config.admin_offset().unwrap_or_else(|_| Utc.fix());
        format_display_time(self.entry.time(), offset)
    }

    /// Role with the masquerade marker, as shown on the dashboard
    pub fn displayed_role(&self) -> String {
        if self.entry.is_masquerade() {
            format!("{}{}", self.entry.role(), MASQUERADE_ROLE_SUFFIX)
        } else {
            self.entry.role().to_string()
        }
    }

    pub fn time_taken_level(&self) -> TimeTakenLevel {
        TimeTakenLevel::of(self.entry.time_taken())
    }

    /// Whether the action failed
    pub fn is_action_warning(&self) -> bool {
        self.entry.action_name().contains(ACTION_RESULT_FAILURE)
    }

    /// Whether the entry reports a system error
    pub fn is_action_danger(&self) -> bool {
        self.entry.action_name().contains(ACTION_RESULT_SYSTEM_ERROR_REPORT)
    }

    pub fn is_testing_data(&self) -> bool {
        self.entry.is_testing_data(&self.config.testing_data_email_suffix)
    }

    /// Message with failure markers and keywords highlighted
    pub fn displayed_message(&self) -> String {
        let message = highlight(
            self.entry.message(),
            &[ACTION_RESULT_FAILURE, ACTION_RESULT_SYSTEM_ERROR_REPORT],
            ACTION_FAILURE_HIGHLIGHT_FRONT,
            ACTION_FAILURE_HIGHLIGHT_BACK,
        );
        highlight(&message, self.keywords.as_slice(), KEYWORD_HIGHLIGHT_FRONT, KEYWORD_HIGHLIGHT_BACK)
    }
}
