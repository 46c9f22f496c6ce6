//! Error types for control block construction.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur when building control blocks.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A gain or limit was NaN or infinite.
    #[error("Non-finite parameter: {what} = {value}")]
    NonFinite { what: &'static str, value: f64 },
}

impl From<cf_core::CfError> for ControlError {
    fn from(e: cf_core::CfError) -> Self {
        match e {
            cf_core::CfError::NonFinite { what, value } => ControlError::NonFinite { what, value },
            cf_core::CfError::InvalidArg { what } => ControlError::InvalidArg { what },
        }
    }
}
