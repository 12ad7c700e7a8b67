//! Harness runner - coordinates planner, orchestrator and cleanup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use cleanup::CleanupEngine;
use contracts::{Framework, HarnessConfig};
use orchestrator::{Launcher, Orchestrator, SelfExecLauncher};
use planner::{ExecutionPlan, ExecutionPlanner};
use store_gateway::{FsObjectStore, ObjectStore, S3ObjectStore};
use tracing::{info, warn};

use super::RunStats;
use crate::error::CliError;

/// Object store the remote trials are removed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// S3 configured from the `AWS_*` environment, optionally at a custom endpoint
    S3 { endpoint: Option<String> },
    /// Buckets mounted as directories under this root
    Mounted(PathBuf),
}

/// Harness run configuration
#[derive(Debug, Clone)]
pub struct HarnessRunConfig {
    /// Loaded and validated job file
    pub config: HarnessConfig,

    /// Framework whose jobs are run
    pub mode: Framework,

    /// Where remote trials live
    pub store: StoreBackend,

    /// Global flags forwarded to worker processes
    pub worker_args: Vec<String>,
}

/// One harness run
pub struct Harness {
    config: HarnessRunConfig,
}

impl Harness {
    pub fn new(config: HarnessRunConfig) -> Self {
        Self { config }
    }

    /// Jobs that will actually be launched
    pub fn jobs_planned(&self) -> usize {
        self.config
            .config
            .jobs
            .iter()
            .filter(|job| job.enabled && job.framework.matches(self.config.mode))
            .count()
    }

    pub fn plan(&self) -> ExecutionPlan {
        ExecutionPlanner::from_config(self.config.mode, &self.config.config)
            .plan(&self.config.config.jobs)
    }

    /// Run with the self-exec launcher and the configured object store
    pub async fn run(self) -> Result<RunStats> {
        let runner = self.config.config.runner.clone();
        let launcher = SelfExecLauncher::current_exe(runner)
            .context("Failed to locate the harness executable")?
            .with_leading_args(self.config.worker_args.clone());

        match self.config.store.clone() {
            StoreBackend::S3 { endpoint } => {
                let mut store = S3ObjectStore::from_env();
                if let Some(endpoint) = &endpoint {
                    store = store.with_endpoint(endpoint);
                }
                info!(endpoint = ?endpoint, "Using S3 object store");
                self.run_with(launcher, Arc::new(store)).await
            }
            StoreBackend::Mounted(root) => {
                info!(root = %root.display(), "Using mounted bucket directory");
                self.run_with(launcher, Arc::new(FsObjectStore::new(root))).await
            }
        }
    }

    /// Plan, launch everything, wait for every process, then clean up
    pub async fn run_with<L, S>(self, launcher: L, store: Arc<S>) -> Result<RunStats>
    where
        L: Launcher,
        S: ObjectStore + Send + Sync + 'static,
    {
        let start = Instant::now();
        let jobs_planned = self.jobs_planned();
        let runner = &self.config.config.runner;

        let (descriptors, locations) = self.plan().into_parts();
        for _ in &locations.local {
            observability::record_location_planned("local");
        }
        for _ in &locations.remote {
            observability::record_location_planned("s3");
        }
        info!(
            mode = %self.config.mode,
            jobs = jobs_planned,
            processes = descriptors.len(),
            "Launching processes"
        );

        let orchestrator = Orchestrator::new(launcher).with_poll_interval(runner.poll_interval());
        let orchestration = orchestrator.run(descriptors).await;

        observability::record_run_duration(orchestration.duration);
        for process in &orchestration.processes {
            observability::record_process_launched(process.target.as_str(), process.started);
            observability::record_process_ended(process.target.as_str(), process.exit_code);
        }

        let engine = CleanupEngine::new(store, runner.work_dir.clone());
        let cleanup = tokio::task::spawn_blocking(move || engine.cleanup(locations))
            .await
            .map_err(CliError::from)?;

        let cleanup = match cleanup {
            Ok(report) => {
                observability::record_cleanup(report.local_removed, report.remote_deleted, true);
                report
            }
            Err(e) => {
                observability::record_cleanup(0, 0, false);
                warn!(error = %e, "Artifact cleanup failed");
                return Err(e).context("Artifact cleanup failed");
            }
        };

        Ok(RunStats {
            jobs_planned,
            orchestration,
            cleanup,
            duration: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{JobSpec, LaunchDescriptor, OutputBase, OutputLocation, RunnerConfig};
    use std::path::Path;
    use store_gateway::MemoryObjectStore;
    use tokio::process::Command;

    /// Writes a marker into the descriptor's output location, like a hooked script
    struct MarkerLauncher {
        work_dir: PathBuf,
        store: Arc<MemoryObjectStore>,
    }

    impl Launcher for MarkerLauncher {
        fn command(&self, descriptor: &LaunchDescriptor) -> orchestrator::Result<Command> {
            let mut cmd = Command::new("sh");
            match &descriptor.output_location {
                OutputLocation::Local(local) => {
                    cmd.arg("-c")
                        .arg("mkdir -p \"$1\" && touch \"$1/events.json\"")
                        .arg("sh")
                        .arg(&local.path);
                }
                OutputLocation::Remote(remote) => {
                    self.store
                        .put_object(&remote.bucket, &format!("{}/events.json", remote.prefix));
                    cmd.arg("-c").arg("exit 0");
                }
            }
            cmd.current_dir(&self.work_dir);
            Ok(cmd)
        }
    }

    fn harness(work_dir: &Path, jobs: Vec<JobSpec>) -> Harness {
        Harness::new(HarnessRunConfig {
            config: HarnessConfig {
                jobs,
                output_bases: vec![
                    OutputBase::parse("./local_test/trial"),
                    OutputBase::parse("s3://bucket/trial"),
                ],
                runner: RunnerConfig {
                    work_dir: work_dir.to_path_buf(),
                    poll_interval_secs: 1,
                    ..Default::default()
                },
            },
            mode: Framework::Tensorflow,
            store: StoreBackend::Mounted(work_dir.join("s3")),
            worker_args: Vec::new(),
        })
    }

    fn job(framework: Framework, enabled: bool) -> JobSpec {
        JobSpec {
            framework,
            enabled,
            train_script_path: "train.py".into(),
            train_args: String::new(),
            test_script_path: "test.py".into(),
            test_args: String::new(),
        }
    }

    #[tokio::test]
    async fn test_run_launches_and_cleans_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryObjectStore::new());
        store.put_object("bucket", "unrelated/object.json");
        let launcher = MarkerLauncher {
            work_dir: dir.path().to_path_buf(),
            store: Arc::clone(&store),
        };

        let stats = harness(dir.path(), vec![job(Framework::Tensorflow, true)])
            .run_with(launcher, Arc::clone(&store))
            .await
            .unwrap();

        assert_eq!(stats.jobs_planned, 1);
        assert_eq!(stats.orchestration.launched(), 6);
        assert_eq!(stats.orchestration.ended(), 6);
        assert_eq!(stats.failed(), 0);
        assert_eq!(stats.cleanup.local_removed, 1);
        assert_eq!(stats.cleanup.remote_prefixes, 2);
        assert_eq!(stats.cleanup.remote_deleted, 2);
        assert!(!dir.path().join("local_test").exists());
        assert_eq!(store.keys("bucket"), vec!["unrelated/object.json"]);
        assert!(store.is_closed());
    }

    #[tokio::test]
    async fn test_run_with_no_matching_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryObjectStore::new());
        let launcher = MarkerLauncher {
            work_dir: dir.path().to_path_buf(),
            store: Arc::clone(&store),
        };

        let stats = harness(
            dir.path(),
            vec![job(Framework::Tensorflow, false), job(Framework::Pytorch, true)],
        )
        .run_with(launcher, Arc::clone(&store))
        .await
        .unwrap();

        assert_eq!(stats.jobs_planned, 0);
        assert_eq!(stats.orchestration.launched(), 0);
        assert_eq!(store.delete_calls(), 0);
    }
}
