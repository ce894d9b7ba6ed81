// Activity log error handling
// Central location for error types shared by the codec, config and generator

use std::fmt;

// Re-export for crates that define their own variants
pub use thiserror;

// Module structure
mod codec;
mod config;

// Public exports
pub use codec::{CodecError, CodecResult};
pub use config::{ConfigError, ConfigResult};

/// Error domains representing different components of the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorDomain {
    Codec,
    Config,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Codec => write!(f, "codec"),
            ErrorDomain::Config => write!(f, "config"),
        }
    }
}

/// Error code structure for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ErrorCode(pub u32);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Common behaviour of every activity log error
pub trait ActivityLogError: std::error::Error + Send + Sync + 'static {
    /// Numeric code of this error
    fn code(&self) -> ErrorCode;

    /// Component the error originates from
    fn domain(&self) -> ErrorDomain;
}
