//! Configuration-level error definitions

use thiserror::Error;

/// Unified error type for loading and validating a job file
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Job entry carries a framework tag outside the recognized set
    #[error("wrong test case category at jobs[{index}]: '{tag}'")]
    UnknownFramework { index: usize, tag: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from an unrecognized framework tag
    pub fn is_unknown_framework(&self) -> bool {
        matches!(self, Self::UnknownFramework { .. })
    }
}
