// Request context supplied by the web layer
//
// The action framework hands these over as plain values; nothing here reads
// an HTTP request directly.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::BTreeMap;
use std::error::Error;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Request parameters, each name mapping to all of its values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(BTreeMap<String, Vec<String>>);

impl RequestParams {
    /// Create an empty parameter map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add a parameter value in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// First value of a parameter
    pub fn first(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameters as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// The authenticated caller and its capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub is_admin: bool,
    pub is_instructor: bool,
    pub is_student: bool,
}

impl CurrentUser {
    /// A logged-in user with no capabilities
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn with_instructor(mut self, is_instructor: bool) -> Self {
        self.is_instructor = is_instructor;
        self
    }

    pub fn with_student(mut self, is_student: bool) -> Self {
        self.is_student = is_student;
        self
    }
}

/// The account an action operates on
///
/// Differs from the caller when an administrator masquerades.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub google_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AccountInfo {
    pub fn new(google_id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            google_id: Some(google_id.into()),
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}

/// A student authenticated through a course registration key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnregisteredStudent {
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
}

impl UnregisteredStudent {
    pub fn new(name: impl Into<String>, email: impl Into<String>, course: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            course: Some(course.into()),
        }
    }
}

/// Error report sent to the system administrators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub subject: String,
    pub content: String,
}

impl ErrorReport {
    pub fn new(subject: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            content: content.into(),
        }
    }

    /// Stable key identifying the report's detail block
    pub fn detail_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.subject.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.content.as_bytes());
        hex::encode(&hasher.finalize()[..8])
    }
}

/// An error being logged as a servlet action failure
///
/// The class is carried explicitly since a boxed error no longer knows the
/// name of its concrete type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFailure {
    /// Class of the error, e.g. `EntityNotFoundException`
    pub class: String,
    /// Display text of the error followed by each of its causes
    pub detail: String,
    /// Captured stack trace
    pub backtrace: Option<String>,
}

impl ActionFailure {
    /// Failure of class `class` described by `error` and its sources
    pub fn new(class: impl Into<String>, error: &(dyn Error + 'static)) -> Self {
        let mut detail = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            detail.push_str("<br>Caused by: ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            class: class.into(),
            detail,
            backtrace: None,
        }
    }

    /// Failure named after the concrete type of `error`
    pub fn from_error<E: Error + 'static>(error: &E) -> Self {
        Self::new(short_type_name::<E>(), error)
    }

    /// Attach a backtrace; one that was not captured is ignored
    pub fn with_backtrace(mut self, backtrace: &Backtrace) -> Self {
        if backtrace.status() == BacktraceStatus::Captured {
            self.backtrace = Some(backtrace.to_string());
        }
        self
    }
}

// Last path segment of a type name, without generic arguments
fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    let path = name.split('<').next().unwrap_or(name);
    path.rsplit("::").next().unwrap_or(path)
}

/// Everything known about the request being logged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionContext {
    pub url: String,
    pub params: RequestParams,
    pub current_user: Option<CurrentUser>,
    pub account: Option<AccountInfo>,
    pub unregistered_student: Option<UnregisteredStudent>,
}

impl ActionContext {
    /// Context of an anonymous request to `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_current_user(mut self, user: CurrentUser) -> Self {
        self.current_user = Some(user);
        self
    }

    pub fn with_account(mut self, account: AccountInfo) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_unregistered_student(mut self, student: UnregisteredStudent) -> Self {
        self.unregistered_student = Some(student);
        self
    }
}
