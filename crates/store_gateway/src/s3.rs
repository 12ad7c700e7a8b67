//! S3-backed object store
//!
//! One client per bucket, built on first use from a shared builder. Region and
//! credentials come from the usual `AWS_*` environment variables.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore as _, RetryConfig};
use tracing::{debug, instrument};

use crate::client::{ListRequest, ObjectStore};
use crate::error::{Result, StoreError};

/// Object store talking to S3 or an S3-compatible endpoint
#[derive(Debug)]
pub struct S3ObjectStore {
    builder: AmazonS3Builder,
    clients: Mutex<HashMap<String, Arc<AmazonS3>>>,
}

impl S3ObjectStore {
    /// Store configured from the environment
    pub fn from_env() -> Self {
        Self::with_builder(AmazonS3Builder::from_env())
    }

    /// Store using `builder` for every bucket; the bucket name is set per client
    pub fn with_builder(builder: AmazonS3Builder) -> Self {
        Self {
            builder,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Send requests to an S3-compatible endpoint instead of AWS
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.builder = self
            .builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"));
        self
    }

    /// Retries per request before an error is returned
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.builder = self.builder.with_retry(RetryConfig {
            max_retries,
            ..Default::default()
        });
        self
    }

    fn client(&self, bucket: &str) -> Result<Arc<AmazonS3>> {
        let mut clients = self.clients();
        if let Some(client) = clients.get(bucket) {
            return Ok(Arc::clone(client));
        }

        let client = self
            .builder
            .clone()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| StoreError::client(bucket, e.to_string()))?;
        let client = Arc::new(client);
        clients.insert(bucket.to_string(), Arc::clone(&client));
        debug!(bucket, "s3 client created");
        Ok(client)
    }

    fn clients(&self) -> MutexGuard<'_, HashMap<String, Arc<AmazonS3>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keys starting with `prefix`, walking the directory below it
    async fn keys_with_prefix(
        client: &AmazonS3,
        prefix: &str,
    ) -> object_store::Result<Vec<String>> {
        let mut keys = Vec::new();
        let parent = prefix.rsplit_once('/').map(|(dir, _)| ObjectPath::from(dir));
        let mut pending = vec![parent];

        while let Some(dir) = pending.pop() {
            let listed = client.list_with_delimiter(dir.as_ref()).await?;

            keys.extend(
                listed
                    .objects
                    .into_iter()
                    .map(|meta| meta.location.to_string())
                    .filter(|key| key.starts_with(prefix)),
            );
            pending.extend(
                listed
                    .common_prefixes
                    .into_iter()
                    .filter(|sub| sub.to_string().starts_with(prefix))
                    .map(Some),
            );
        }

        keys.sort();
        Ok(keys)
    }
}

impl ObjectStore for S3ObjectStore {
    #[instrument(name = "s3_store_list", skip(self, requests), fields(requests = requests.len()))]
    async fn list_prefixes(&self, requests: &[ListRequest]) -> Result<Vec<Vec<String>>> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let client = self.client(&request.bucket)?;
            let keys = Self::keys_with_prefix(&client, &request.prefix)
                .await
                .map_err(|e| StoreError::list(&request.bucket, &request.prefix, e.to_string()))?;
            results.push(keys);
        }
        Ok(results)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let client = self.client(bucket)?;
        match client.delete(&ObjectPath::from(key)).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => {
                debug!(bucket, key, "object already absent");
                Ok(())
            }
            Err(e) => Err(StoreError::delete(bucket, key, e.to_string())),
        }
    }

    async fn close(&self) -> Result<()> {
        let mut clients = self.clients();
        debug!(clients = clients.len(), "s3 object store closed");
        clients.clear();
        Ok(())
    }
}
