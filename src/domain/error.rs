use thiserror::Error;

/// Rejections raised by `start` before any job is queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A destination directory must be selected before starting")]
    EmptyDestination,

    #[error("At least one URL must be provided")]
    EmptyBatch,

    #[error("A batch is already running")]
    RunInProgress,
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Invalid batch: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Transfer cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}
