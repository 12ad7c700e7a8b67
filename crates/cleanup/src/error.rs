//! Cleanup error types

use std::path::PathBuf;

use store_gateway::StoreError;
use thiserror::Error;

/// Errors removing trial artifacts
#[derive(Debug, Error)]
pub enum CleanupError {
    /// Local directory could not be removed
    #[error("failed to remove local directory {}: {source}", path.display())]
    Local {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote listing, deletion or close failed
    #[error("remote cleanup failed: {0}")]
    Remote(#[from] StoreError),

    /// Dedicated runtime could not be built
    #[error("failed to start cleanup runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Delete task panicked or was cancelled
    #[error("delete task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result alias
pub type Result<T> = std::result::Result<T, CleanupError>;
