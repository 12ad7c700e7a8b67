//! Orchestrator error types

use thiserror::Error;

/// Errors building, spawning or running a process
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Worker task could not be encoded for the command line
    #[error("failed to encode worker task for '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// OS refused to start the process
    #[error("failed to spawn process '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Worker could not run a script at all
    #[error("failed to run {phase} script '{script}': {source}")]
    Script {
        phase: &'static str,
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias
pub type Result<T> = std::result::Result<T, LaunchError>;
