//! Store Gateway error types

use thiserror::Error;

/// Object store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Listing a prefix failed
    #[error("failed to list s3://{bucket}/{prefix}: {message}")]
    ListFailed {
        bucket: String,
        prefix: String,
        message: String,
    },

    /// Deleting an object failed
    #[error("failed to delete s3://{bucket}/{key}: {message}")]
    DeleteFailed {
        bucket: String,
        key: String,
        message: String,
    },

    /// Client for a bucket could not be built
    #[error("failed to create a client for bucket '{bucket}': {message}")]
    Client { bucket: String, message: String },

    /// Bucket or key that cannot be mapped safely
    #[error("invalid object name '{name}': {message}")]
    InvalidName { name: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create list error
    pub fn list(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ListFailed {
            bucket: bucket.into(),
            prefix: prefix.into(),
            message: message.into(),
        }
    }

    /// Create delete error
    pub fn delete(
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DeleteFailed {
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn client(bucket: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Client {
            bucket: bucket.into(),
            message: message.into(),
        }
    }

    pub fn invalid_name(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, StoreError>;
