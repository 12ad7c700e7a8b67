//! In-memory object store
//!
//! Used by unit and end-to-end tests; supports injected delete failures.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::instrument;

use crate::client::{ListRequest, ObjectStore};
use crate::error::{Result, StoreError};

/// Failure injection for [`MemoryObjectStore`]
#[derive(Debug, Default, Clone)]
pub struct MemoryStoreConfig {
    /// Deleting any of these keys fails
    pub fail_delete_keys: Vec<String>,
    /// Every list request fails
    pub fail_list: bool,
    /// Closing fails (the store still counts as closed)
    pub fail_close: bool,
}

/// Object store held in process memory
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    config: MemoryStoreConfig,
    /// bucket -> keys
    buckets: Mutex<BTreeMap<String, BTreeSet<String>>>,
    list_requests: AtomicUsize,
    delete_calls: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Store an (empty) object
    pub fn put_object(&self, bucket: &str, key: &str) {
        self.buckets()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string());
    }

    /// Keys currently stored in `bucket`, sorted
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets()
            .get(bucket)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Total object count over all buckets
    pub fn object_count(&self) -> usize {
        self.buckets().values().map(BTreeSet::len).sum()
    }

    /// Number of list requests served
    pub fn list_requests(&self) -> usize {
        self.list_requests.load(Ordering::SeqCst)
    }

    /// Number of delete calls received, failed ones included
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn buckets(&self) -> MutexGuard<'_, BTreeMap<String, BTreeSet<String>>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ObjectStore for MemoryObjectStore {
    #[instrument(
        name = "memory_store_list",
        skip(self, requests),
        fields(requests = requests.len())
    )]
    async fn list_prefixes(&self, requests: &[ListRequest]) -> Result<Vec<Vec<String>>> {
        self.list_requests
            .fetch_add(requests.len(), Ordering::SeqCst);

        let buckets = self.buckets();
        requests
            .iter()
            .map(|request| {
                if self.config.fail_list {
                    return Err(StoreError::list(
                        &request.bucket,
                        &request.prefix,
                        "injected failure",
                    ));
                }
                Ok(buckets
                    .get(&request.bucket)
                    .map(|keys| {
                        keys.iter()
                            .filter(|key| key.starts_with(&request.prefix))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default())
            })
            .collect()
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        // let sibling deletes of the same batch interleave
        tokio::task::yield_now().await;

        if self.config.fail_delete_keys.iter().any(|k| k == key) {
            return Err(StoreError::delete(bucket, key, "injected failure"));
        }

        if let Some(keys) = self.buckets().get_mut(bucket) {
            keys.remove(key);
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        if self.config.fail_close {
            return Err(std::io::Error::other("injected close failure").into());
        }
        Ok(())
    }
}
