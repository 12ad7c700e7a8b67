//! # Cleanup
//!
//! Artifact Cleanup Engine.
//!
//! Runs once every process has ended and removes what the trials wrote:
//! - local trial locations, by deleting their top-level directory
//! - remote trial prefixes, by listing them and deleting every key concurrently
//!
//! Local cleanup runs first. The first failure is returned to the caller.

pub mod error;
pub mod local;
pub mod remote;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::OutputLocations;
use serde::Serialize;
use store_gateway::ObjectStore;
use tracing::{info, instrument};

pub use error::{CleanupError, Result};
pub use local::remove_local;
pub use remote::{remove_remote, RemoteCleanup};

/// What a cleanup pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Local top-level directories removed
    pub local_removed: usize,
    /// Remote prefixes listed
    pub remote_prefixes: usize,
    /// Remote objects deleted
    pub remote_deleted: usize,
    pub duration: Duration,
}

/// Removes trial artifacts from disk and from the object store
pub struct CleanupEngine<S> {
    store: Arc<S>,
    /// Local locations are relative to this directory
    work_dir: PathBuf,
}

impl<S> CleanupEngine<S>
where
    S: ObjectStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            work_dir: work_dir.into(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Remove every location, local first
    ///
    /// Blocks the calling thread; the remote phase drives its own runtime, so
    /// async callers go through `spawn_blocking`.
    #[instrument(
        name = "cleanup",
        skip(self, locations),
        fields(local = locations.local.len(), remote = locations.remote.len())
    )]
    pub fn cleanup(&self, locations: OutputLocations) -> Result<CleanupReport> {
        let start = Instant::now();

        let local_removed = remove_local(&self.work_dir, &locations.local)?;
        info!(removed = local_removed, "local cleanup finished");

        let remote = remove_remote(Arc::clone(&self.store), &locations.remote)?;
        info!(deleted = remote.deleted, "remote cleanup finished");

        Ok(CleanupReport {
            local_removed,
            remote_prefixes: remote.prefixes,
            remote_deleted: remote.deleted,
            duration: start.elapsed(),
        })
    }
}
