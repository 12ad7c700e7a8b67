//! Object store abstraction
//!
//! Implemented by the S3, in-memory and directory-backed stores.

use crate::error::Result;

/// List-by-prefix request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub bucket: String,
    pub prefix: String,
}

impl ListRequest {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }
}

/// Object store trait
#[trait_variant::make(ObjectStore: Send)]
pub trait LocalObjectStore {
    /// Keys under each requested prefix
    ///
    /// Returns one key list per request, in request order.
    async fn list_prefixes(&self, requests: &[ListRequest]) -> Result<Vec<Vec<String>>>;

    /// Delete one object
    ///
    /// Deleting a key that does not exist succeeds.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Release the client
    async fn close(&self) -> Result<()>;
}
