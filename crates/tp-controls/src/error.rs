//! Error types for control system operations.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
///
/// None of these stop the control loop; a failed sensor read is treated as
/// "temperature unavailable" for that iteration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// The temperature source could not produce a reading.
    #[error("Temperature source failed: {what}")]
    SourceFailed { what: String },
}
