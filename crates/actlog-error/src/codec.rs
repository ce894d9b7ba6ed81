// Codec-specific error types
// Raised while turning wire lines back into entries

use thiserror::Error;
use crate::{ActivityLogError, ErrorCode, ErrorDomain};

/// Codec error codes
pub mod codes {
    use crate::ErrorCode;

    // Codec error codes start with 1000
    pub const TOO_FEW_FIELDS: ErrorCode = ErrorCode(1001);
    pub const INVALID_TIME_TAKEN: ErrorCode = ErrorCode(1002);
    pub const UNKNOWN_ROLE: ErrorCode = ErrorCode(1003);
}

/// Errors produced while decoding a wire line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The line does not carry every fixed-position field
    #[error("expected at least {expected} fields but found {found}")]
    TooFewFields { expected: usize, found: usize },

    /// The elapsed-time field is not an integer
    #[error("time taken is not a number: {0}")]
    InvalidTimeTaken(String),

    /// The role field names no known role
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

impl ActivityLogError for CodecError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            CodecError::TooFewFields { .. } => TOO_FEW_FIELDS,
            CodecError::InvalidTimeTaken(_) => INVALID_TIME_TAKEN,
            CodecError::UnknownRole(_) => UNKNOWN_ROLE,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Codec
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
