//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Job file not found
    #[error("Job file not found: {path}")]
    ConfigNotFound { path: String },

    /// Worker task argument could not be decoded
    #[error("Invalid worker task: {message}")]
    InvalidTask { message: String },

    /// Strict mode and at least one process failed
    #[error("{failed} of {total} processes failed")]
    ProcessFailures { failed: usize, total: usize },

    /// Blocking cleanup task did not complete
    #[error("Cleanup task aborted: {0}")]
    CleanupAborted(#[from] tokio::task::JoinError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_task(message: impl Into<String>) -> Self {
        Self::InvalidTask {
            message: message.into(),
        }
    }
}
