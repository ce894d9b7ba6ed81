// User roles recorded in activity log entries

use std::fmt;
use std::str::FromStr;

use actlog_error::CodecError;
use serde::{Deserialize, Serialize};

/// Effective role of the caller of an action
///
/// Masquerade is tracked separately on the entry; the role itself is always
/// the bare role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Instructor,
    Student,
    /// Not registered; carries the course id when joining through a key
    Unregistered(Option<String>),
    /// Automated (system-triggered) action
    Auto,
    #[default]
    Unknown,
}

impl UserRole {
    /// Name of the role without any course id
    pub fn kind(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Instructor => "Instructor",
            UserRole::Student => "Student",
            UserRole::Unregistered(_) => "Unregistered",
            UserRole::Auto => "Auto",
            UserRole::Unknown => "Unknown",
        }
    }

    /// Whether both roles are of the same kind, ignoring the course id
    pub fn same_kind(&self, other: &UserRole) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Unregistered role for a student joining `course_id`
    pub fn unregistered_in(course_id: Option<&str>) -> Self {
        UserRole::Unregistered(course_id.filter(|c| !c.is_empty()).map(str::to_string))
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Unregistered(Some(course)) => write!(f, "Unregistered:{}", course),
            other => write!(f, "{}", other.kind()),
        }
    }
}

impl FromStr for UserRole {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(UserRole::Admin),
            "Instructor" => Ok(UserRole::Instructor),
            "Student" => Ok(UserRole::Student),
            "Auto" => Ok(UserRole::Auto),
            "Unknown" => Ok(UserRole::Unknown),
            "Unregistered" => Ok(UserRole::Unregistered(None)),
            other => match other.strip_prefix("Unregistered:") {
                Some(course) => Ok(UserRole::unregistered_in(Some(course))),
                None => Err(CodecError::UnknownRole(other.to_string())),
            },
        }
    }
}
