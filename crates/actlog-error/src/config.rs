// Configuration error types

use thiserror::Error;
use crate::{ActivityLogError, ErrorCode, ErrorDomain};

/// Config error codes
pub mod codes {
    use crate::ErrorCode;

    // Config error codes start with 2000
    pub const IO_ERROR: ErrorCode = ErrorCode(2001);
    pub const PARSE_ERROR: ErrorCode = ErrorCode(2002);
    pub const INVALID_UTC_OFFSET: ErrorCode = ErrorCode(2003);
    pub const EMPTY_VALUE: ErrorCode = ErrorCode(2004);
}

/// Errors produced while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("IO error: {0}")]
    Io(String),

    /// The configuration text is not valid TOML for the config schema
    #[error("Parse error: {0}")]
    Parse(String),

    /// The administrative UTC offset is out of range
    #[error("UTC offset out of range: {0} minutes")]
    InvalidUtcOffset(i32),

    /// A required setting is empty
    #[error("setting must not be empty: {0}")]
    EmptyValue(&'static str),
}

impl ActivityLogError for ConfigError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            ConfigError::Io(_) => IO_ERROR,
            ConfigError::Parse(_) => PARSE_ERROR,
            ConfigError::InvalidUtcOffset(_) => INVALID_UTC_OFFSET,
            ConfigError::EmptyValue(_) => EMPTY_VALUE,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Config
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
