//! Directory-backed object store
//!
//! Bucket `b` lives at `<root>/b`, key `k/x.json` at `<root>/b/k/x.json`.
//! Fits buckets mounted locally (s3fs, test fixtures). A bucket directory that
//! does not exist is an error, like a missing S3 bucket.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use crate::client::{ListRequest, ObjectStore};
use crate::error::{Result, StoreError};

/// Object store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an object, creating intermediate directories
    pub async fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, body).await?;
        Ok(())
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
            return Err(StoreError::invalid_name(bucket, "not a valid bucket name"));
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StoreError::invalid_name(key, "key escapes its bucket"));
        }
        Ok(self.bucket_dir(bucket)?.join(relative))
    }

    /// All keys of a bucket, sorted
    async fn all_keys(&self, bucket_dir: &Path) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![bucket_dir.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(bucket_dir) {
                    keys.push(to_key(relative));
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Remove directories left empty by a delete, stopping at the bucket
    async fn prune_empty_parents(&self, bucket_dir: &Path, object: &Path) {
        let mut current = object.parent();
        while let Some(dir) = current {
            if dir == bucket_dir || !dir.starts_with(bucket_dir) {
                break;
            }
            // fails when not empty or already gone; either way stop climbing
            if tokio::fs::remove_dir(dir).await.is_err() {
                break;
            }
            current = dir.parent();
        }
    }
}

fn to_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl ObjectStore for FsObjectStore {
    #[instrument(
        name = "fs_store_list",
        skip(self, requests),
        fields(root = %self.root.display(), requests = requests.len())
    )]
    async fn list_prefixes(&self, requests: &[ListRequest]) -> Result<Vec<Vec<String>>> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let bucket_dir = self.bucket_dir(&request.bucket)?;
            if !tokio::fs::try_exists(&bucket_dir).await.unwrap_or(false) {
                return Err(StoreError::list(
                    &request.bucket,
                    &request.prefix,
                    format!("no such bucket under {}", self.root.display()),
                ));
            }
            let keys = self
                .all_keys(&bucket_dir)
                .await
                .map_err(|e| StoreError::list(&request.bucket, &request.prefix, e.to_string()))?;
            results.push(
                keys.into_iter()
                    .filter(|key| key.starts_with(&request.prefix))
                    .collect(),
            );
        }
        Ok(results)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let bucket_dir = self.bucket_dir(bucket)?;
        let path = self.object_path(bucket, key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(bucket, key, "object already absent");
            }
            Err(e) => return Err(StoreError::delete(bucket, key, e.to_string())),
        }

        self.prune_empty_parents(&bucket_dir, &path).await;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        debug!(root = %self.root.display(), "fs object store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        store.put_object("bucket", "trial1/events/0.json", b"{}").await.unwrap();
        store.put_object("bucket", "trial1/index/0.json", b"{}").await.unwrap();
        store.put_object("bucket", "trial10/events/0.json", b"{}").await.unwrap();
        store.put_object("bucket", "other/0.json", b"{}").await.unwrap();

        let keys = store
            .list_prefixes(&[ListRequest::new("bucket", "trial1")])
            .await
            .unwrap();
        assert_eq!(
            keys[0],
            vec![
                "trial1/events/0.json",
                "trial1/index/0.json",
                "trial10/events/0.json"
            ]
        );

        for key in &keys[0] {
            store.delete_object("bucket", key).await.unwrap();
        }

        assert!(!dir.path().join("bucket/trial1").exists());
        assert!(dir.path().join("bucket/other/0.json").exists());
    }

    #[tokio::test]
    async fn test_missing_bucket_fails_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path().join("s3"));
        let err = store
            .list_prefixes(&[ListRequest::new("tornasolecodebuildtest", "trial1")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ListFailed { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn test_existing_bucket_without_matches_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        store.put_object("bucket", "other/0.json", b"{}").await.unwrap();
        let keys = store
            .list_prefixes(&[ListRequest::new("bucket", "trial")])
            .await
            .unwrap();
        assert_eq!(keys, vec![Vec::<String>::new()]);
    }

    #[tokio::test]
    async fn test_delete_missing_object_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        store.delete_object("bucket", "nothing/here").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        let err = store.delete_object("bucket", "../outside").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName { .. }));
        let err = store.delete_object("..", "key").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName { .. }));
    }
}
