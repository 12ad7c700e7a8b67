//! # Integration Tests
//!
//! Cross-crate and end-to-end scenarios.
//!
//! Covers:
//! - Job file to plan (loader + planner)
//! - Full run with real processes: plan, launch, poll, clean up

#[cfg(test)]
mod plan_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Framework, HarnessError};
    use planner::ExecutionPlanner;

    #[test]
    fn test_unknown_tag_fails_before_planning() {
        let content = r#"
jobs = [
    ["tensorflow", true, ["train.py", "", "test.py", ""]],
    ["theano", true, ["train.py", "", "test.py", ""]],
]
"#;
        let err = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::UnknownFramework { index: 1, ref tag } if tag == "theano"
        ));
    }

    #[test]
    fn test_disabled_and_values_jobs_plan_nothing() {
        let content = r#"
jobs = [
    ["tensorflow", false, ["train.py", "", "test.py", ""]],
    ["values", true, ["gen.py", "", "check.py", ""]],
]
"#;
        let config = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        for mode in [Framework::Tensorflow, Framework::Values] {
            let plan = ExecutionPlanner::from_config(mode, &config).plan(&config.jobs);
            assert!(plan.is_empty());
            assert!(plan.locations.is_empty());
        }
    }

    #[test]
    fn test_json_job_file_plans_six_per_job() {
        let content = r#"{
  "jobs": [
    ["pytorch", true, ["a.py", "", "b.py", ""]],
    ["pytorch", true, ["c.py", "--x 1", "d.py", ""]],
    ["mxnet", true, ["e.py", "", "f.py", ""]]
  ],
  "outputs": { "local_base": "./out/trial", "remote_base": "s3://bucket/runs/trial" }
}"#;
        let config = ConfigLoader::load_from_str(content, ConfigFormat::Json).unwrap();
        let plan = ExecutionPlanner::from_config(Framework::Pytorch, &config).plan(&config.jobs);

        assert_eq!(plan.descriptors.len(), 12);
        assert_eq!(plan.locations.local.len(), 4);
        assert_eq!(plan.locations.remote.len(), 4);
        assert!(plan
            .locations
            .remote
            .iter()
            .all(|r| r.bucket == "bucket" && r.prefix.starts_with("runs/trial")));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use cleanup::CleanupEngine;
    use contracts::{
        Framework, HarnessConfig, JobSpec, LaunchDescriptor, OutputBase, RunnerConfig,
        TargetFunction, WorkerTask,
    };
    use orchestrator::{script_command, Launcher, Orchestrator, ScriptPhase};
    use planner::ExecutionPlanner;
    use store_gateway::{FsObjectStore, MemoryObjectStore};
    use tokio::process::Command;

    /// Runs one script phase per descriptor directly, in the work directory
    ///
    /// Serial pairs run their training script only; enough to write the trial.
    struct ScriptLauncher {
        runner: RunnerConfig,
        store_root: PathBuf,
    }

    impl Launcher for ScriptLauncher {
        fn command(&self, descriptor: &LaunchDescriptor) -> orchestrator::Result<Command> {
            let task = WorkerTask::from_descriptor(descriptor, &self.runner);
            let phase = match descriptor.target {
                TargetFunction::RunTestOnly => ScriptPhase::Test,
                _ => ScriptPhase::Train,
            };
            let mut cmd = script_command(phase, &task);
            cmd.env("STORE_ROOT", &self.store_root)
                .current_dir(&self.runner.work_dir);
            Ok(cmd)
        }
    }

    /// Writes one event file into the trial named by `$2`; s3 URIs map into $STORE_ROOT
    const WRITER_SCRIPT: &str = r#"
case "$2" in
  s3://*) dir="$STORE_ROOT/${2#s3://}" ;;
  *) dir="$2" ;;
esac
mkdir -p "$dir/events" && touch "$dir/events/000000000000_worker_0.tfevents"
"#;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn config(work_dir: &Path, scripts: &Path) -> HarnessConfig {
        HarnessConfig {
            jobs: vec![
                JobSpec {
                    framework: Framework::Tensorflow,
                    enabled: true,
                    train_script_path: write_script(scripts, "train.sh", WRITER_SCRIPT),
                    train_args: "--steps 1".into(),
                    test_script_path: write_script(scripts, "test.sh", "exit 0\n"),
                    test_args: String::new(),
                },
                JobSpec {
                    framework: Framework::Tensorflow,
                    enabled: false,
                    train_script_path: "never.sh".into(),
                    train_args: String::new(),
                    test_script_path: "never.sh".into(),
                    test_args: String::new(),
                },
            ],
            output_bases: vec![
                OutputBase::parse("./local_test/trial"),
                OutputBase::parse("s3://tornasolecodebuildtest/trial"),
            ],
            runner: RunnerConfig {
                interpreter: "sh".into(),
                work_dir: work_dir.to_path_buf(),
                ..Default::default()
            },
        }
    }

    fn files_under(dir: &Path) -> usize {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return 0;
        };
        entries
            .map(|e| e.unwrap().path())
            .map(|p| if p.is_dir() { files_under(&p) } else { 1 })
            .sum()
    }

    /// One tensorflow job: 6 processes, all ended, 2 local + 2 remote trials removed
    #[tokio::test]
    async fn test_e2e_run_and_cleanup() {
        let work = tempfile::tempdir().unwrap();
        let scripts = tempfile::tempdir().unwrap();
        let store_root = tempfile::tempdir().unwrap();
        let config = config(work.path(), scripts.path());

        let plan = ExecutionPlanner::from_config(Framework::Tensorflow, &config).plan(&config.jobs);
        let (descriptors, locations) = plan.into_parts();
        assert_eq!(descriptors.len(), 6);
        assert_eq!(locations.local.len(), 2);
        assert_eq!(locations.remote.len(), 2);

        let launcher = ScriptLauncher {
            runner: config.runner.clone(),
            store_root: store_root.path().to_path_buf(),
        };
        let report = Orchestrator::new(launcher)
            .with_poll_interval(Duration::from_millis(50))
            .run(descriptors)
            .await;

        assert_eq!(report.launched(), 6);
        assert_eq!(report.ended(), 6);
        assert!(report.all_succeeded());

        // every location was written
        for local in &locations.local {
            assert!(work.path().join(&local.path).join("events").exists());
        }
        let bucket_dir = store_root.path().join("tornasolecodebuildtest");
        assert_eq!(files_under(&bucket_dir), 2);

        // a foreign object in the same bucket survives cleanup
        let store = Arc::new(FsObjectStore::new(store_root.path()));
        store
            .put_object("tornasolecodebuildtest", "keep/me.json", b"{}")
            .await
            .unwrap();

        let engine = CleanupEngine::new(Arc::clone(&store), work.path());
        let cleanup = tokio::task::spawn_blocking(move || engine.cleanup(locations))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(cleanup.local_removed, 1);
        assert_eq!(cleanup.remote_prefixes, 2);
        assert_eq!(cleanup.remote_deleted, 2);
        assert!(!work.path().join("local_test").exists());
        assert_eq!(files_under(&bucket_dir), 1);
        assert!(bucket_dir.join("keep/me.json").exists());
    }

    /// Failing scripts end their records and leave siblings running; cleanup still runs
    #[tokio::test]
    async fn test_e2e_failures_are_soft() {
        let work = tempfile::tempdir().unwrap();
        let scripts = tempfile::tempdir().unwrap();
        let mut config = config(work.path(), scripts.path());
        config.jobs[0].test_script_path = write_script(scripts.path(), "fail.sh", "exit 7\n");

        let plan = ExecutionPlanner::from_config(Framework::Tensorflow, &config).plan(&config.jobs);
        let (descriptors, locations) = plan.into_parts();

        let launcher = ScriptLauncher {
            runner: config.runner.clone(),
            store_root: work.path().join("s3"),
        };
        let report = Orchestrator::new(launcher)
            .with_poll_interval(Duration::from_millis(50))
            .run(descriptors)
            .await;

        assert_eq!(report.ended(), 6);
        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 2);
        assert!(failed
            .iter()
            .all(|p| p.target == TargetFunction::RunTestOnly && p.exit_code == Some(7)));

        // nothing was listed under the remote prefixes of the memory store
        let store = Arc::new(MemoryObjectStore::new());
        let engine = CleanupEngine::new(Arc::clone(&store), work.path());
        let cleanup = tokio::task::spawn_blocking(move || engine.cleanup(locations))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(cleanup.local_removed, 1);
        assert_eq!(store.list_requests(), 2);
        assert_eq!(store.delete_calls(), 0);
        assert!(store.is_closed());
    }
}
