//! Remote prefix removal
//!
//! Lists every prefix, then deletes all keys concurrently on a current-thread
//! runtime that lives only for this call.

use std::collections::BTreeSet;
use std::sync::Arc;

use contracts::RemoteLocation;
use store_gateway::{ListRequest, ObjectStore};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::{CleanupError, Result};

/// Outcome of the remote phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteCleanup {
    pub prefixes: usize,
    pub deleted: usize,
}

/// Delete every object under the given prefixes
///
/// Only the bucket of the last location is used; all prefixes are looked up
/// in that bucket. Must not be called from inside a tokio runtime.
pub fn remove_remote<S>(
    store: Arc<S>,
    locations: &BTreeSet<RemoteLocation>,
) -> Result<RemoteCleanup>
where
    S: ObjectStore + Send + Sync + 'static,
{
    let Some(last) = locations.iter().next_back() else {
        debug!("no remote locations to clean");
        return Ok(RemoteCleanup::default());
    };
    let bucket = last.bucket.clone();
    if locations.iter().any(|l| l.bucket != bucket) {
        warn!(
            bucket = %bucket,
            "remote locations span several buckets, only the last one is cleaned"
        );
    }

    let requests: Vec<ListRequest> = locations
        .iter()
        .map(|l| ListRequest::new(&bucket, &l.prefix))
        .collect();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CleanupError::Runtime)?;

    let result = runtime.block_on(delete_all(Arc::clone(&store), bucket, requests));
    drop(runtime);
    result
}

#[instrument(
    name = "cleanup_remote",
    skip(store, bucket, requests),
    fields(bucket = %bucket, prefixes = requests.len())
)]
async fn delete_all<S>(
    store: Arc<S>,
    bucket: String,
    requests: Vec<ListRequest>,
) -> Result<RemoteCleanup>
where
    S: ObjectStore + Send + Sync + 'static,
{
    let listed = match store.list_prefixes(&requests).await {
        Ok(listed) => listed,
        Err(e) => {
            // still release the client
            if let Err(close_err) = store.close().await {
                warn!(error = %close_err, "failed to close object store");
            }
            return Err(e.into());
        }
    };
    let keys: Vec<String> = listed.into_iter().flatten().collect();
    debug!(keys = keys.len(), "remote keys listed");

    let mut deletes = JoinSet::new();
    for key in keys {
        let store = Arc::clone(&store);
        let bucket = bucket.clone();
        deletes.spawn(async move { store.delete_object(&bucket, &key).await });
    }

    let mut deleted = 0;
    let mut first_error: Option<CleanupError> = None;
    while let Some(joined) = deletes.join_next().await {
        match joined {
            Ok(Ok(())) => deleted += 1,
            Ok(Err(e)) => {
                warn!(error = %e, "remote delete failed");
                first_error.get_or_insert(e.into());
            }
            Err(e) => {
                first_error.get_or_insert(e.into());
            }
        }
    }

    let closed = store.close().await;
    if let Some(e) = first_error {
        if let Err(close_err) = closed {
            warn!(error = %close_err, "failed to close object store");
        }
        return Err(e);
    }
    closed?;

    info!(deleted, "remote trial objects removed");
    Ok(RemoteCleanup {
        prefixes: requests.len(),
        deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{OutputBase, OutputLocation};
    use store_gateway::{MemoryObjectStore, MemoryStoreConfig, StoreError};

    fn remote(base: &str, stamp: &str) -> RemoteLocation {
        match OutputBase::parse(base).stamped(stamp) {
            OutputLocation::Remote(remote) => remote,
            OutputLocation::Local(_) => unreachable!(),
        }
    }

    #[test]
    fn test_deletes_every_key_under_prefixes() {
        let store = Arc::new(MemoryObjectStore::new());
        store.put_object("bucket", "trial1/events/0.json");
        store.put_object("bucket", "trial1/index/0.json");
        store.put_object("bucket", "trial2/events/0.json");
        store.put_object("bucket", "unrelated/0.json");

        let locations = BTreeSet::from([
            remote("s3://bucket/trial", "1"),
            remote("s3://bucket/trial", "2"),
        ]);
        let outcome = remove_remote(Arc::clone(&store), &locations).unwrap();

        assert_eq!(
            outcome,
            RemoteCleanup {
                prefixes: 2,
                deleted: 3
            }
        );
        assert_eq!(store.keys("bucket"), vec!["unrelated/0.json"]);
        assert!(store.is_closed());
    }

    #[test]
    fn test_zero_keys_means_zero_deletes() {
        let store = Arc::new(MemoryObjectStore::new());
        let locations = BTreeSet::from([remote("s3://bucket/trial", "1")]);

        let outcome = remove_remote(Arc::clone(&store), &locations).unwrap();
        assert_eq!(outcome.deleted, 0);
        assert_eq!(store.list_requests(), 1);
        assert_eq!(store.delete_calls(), 0);
        assert!(store.is_closed());
    }

    #[test]
    fn test_empty_set_touches_nothing() {
        let store = Arc::new(MemoryObjectStore::new());
        let outcome = remove_remote(Arc::clone(&store), &BTreeSet::new()).unwrap();
        assert_eq!(outcome, RemoteCleanup::default());
        assert_eq!(store.list_requests(), 0);
    }

    #[test]
    fn test_only_last_bucket_is_used() {
        let store = Arc::new(MemoryObjectStore::new());
        store.put_object("alpha", "trial1/0.json");
        store.put_object("beta", "trial1/0.json");
        store.put_object("beta", "trial2/0.json");

        let locations = BTreeSet::from([
            remote("s3://alpha/trial", "1"),
            remote("s3://beta/trial", "2"),
        ]);
        let outcome = remove_remote(Arc::clone(&store), &locations).unwrap();

        // both prefixes are looked up in "beta"
        assert_eq!(outcome.deleted, 2);
        assert_eq!(store.keys("alpha"), vec!["trial1/0.json"]);
        assert!(store.keys("beta").is_empty());
    }

    #[test]
    fn test_delete_failure_propagates_after_all_complete() {
        let store = Arc::new(MemoryObjectStore::with_config(MemoryStoreConfig {
            fail_delete_keys: vec!["trial1/b.json".into()],
            ..Default::default()
        }));
        store.put_object("bucket", "trial1/a.json");
        store.put_object("bucket", "trial1/b.json");
        store.put_object("bucket", "trial1/c.json");

        let err = remove_remote(
            Arc::clone(&store),
            &BTreeSet::from([remote("s3://bucket/trial", "1")]),
        )
        .unwrap_err();

        assert!(matches!(err, CleanupError::Remote(_)));
        assert_eq!(store.delete_calls(), 3);
        assert_eq!(store.keys("bucket"), vec!["trial1/b.json"]);
        assert!(store.is_closed());
    }

    #[test]
    fn test_delete_error_wins_over_close_error() {
        let store = Arc::new(MemoryObjectStore::with_config(MemoryStoreConfig {
            fail_delete_keys: vec!["trial1/a.json".into()],
            fail_close: true,
            ..Default::default()
        }));
        store.put_object("bucket", "trial1/a.json");

        let err = remove_remote(
            Arc::clone(&store),
            &BTreeSet::from([remote("s3://bucket/trial", "1")]),
        )
        .unwrap_err();
        assert!(
            matches!(err, CleanupError::Remote(StoreError::DeleteFailed { .. })),
            "got: {err:?}"
        );
    }

    #[test]
    fn test_close_failure_surfaces() {
        let store = Arc::new(MemoryObjectStore::with_config(MemoryStoreConfig {
            fail_close: true,
            ..Default::default()
        }));
        store.put_object("bucket", "trial1/a.json");

        let err = remove_remote(
            Arc::clone(&store),
            &BTreeSet::from([remote("s3://bucket/trial", "1")]),
        )
        .unwrap_err();
        assert!(matches!(err, CleanupError::Remote(StoreError::Io(_))), "got: {err:?}");
        assert!(store.keys("bucket").is_empty());
    }

    #[test]
    fn test_list_failure_propagates() {
        let store = Arc::new(MemoryObjectStore::with_config(MemoryStoreConfig {
            fail_list: true,
            ..Default::default()
        }));
        let err = remove_remote(
            Arc::clone(&store),
            &BTreeSet::from([remote("s3://bucket/trial", "1")]),
        )
        .unwrap_err();
        assert!(matches!(err, CleanupError::Remote(_)));
        assert_eq!(store.delete_calls(), 0);
    }
}
