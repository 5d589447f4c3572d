//! Error types for the tp-app service layer.

/// Application error type wrapping errors from the backend crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Control error: {0}")]
    Control(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for tp-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<tp_project::ProjectError> for AppError {
    fn from(err: tp_project::ProjectError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<tp_controls::ControlError> for AppError {
    fn from(err: tp_controls::ControlError) -> Self {
        AppError::Control(err.to_string())
    }
}
