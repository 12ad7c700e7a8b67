//! Job file document and the validated harness configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::{JobEntry, JobSpec, OutputBase};

/// Job file as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDocument {
    /// Job entries in declaration order
    pub jobs: Vec<JobEntry>,

    /// Output bases
    #[serde(default)]
    pub outputs: OutputConfig,

    /// Script invocation settings
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Accepted top-level shapes of a job file
///
/// A bare list holds only job entries; outputs and runner take their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobFile {
    Bare(Vec<JobEntry>),
    Keyed(JobDocument),
}

impl From<JobFile> for JobDocument {
    fn from(file: JobFile) -> Self {
        match file {
            JobFile::Bare(jobs) => JobDocument {
                jobs,
                outputs: OutputConfig::default(),
                runner: RunnerConfig::default(),
            },
            JobFile::Keyed(document) => document,
        }
    }
}

/// Base locations every enabled job is run against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_local_base")]
    pub local_base: String,

    #[serde(default = "default_remote_base")]
    pub remote_base: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            local_base: default_local_base(),
            remote_base: default_remote_base(),
        }
    }
}

fn default_local_base() -> String {
    "./local_test/trial".to_string()
}

fn default_remote_base() -> String {
    "s3://tornasolecodebuildtest/trial".to_string()
}

/// How worker processes invoke the train/test scripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Program the scripts are run with
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Environment variable carrying the hook's log level
    #[serde(default = "default_log_level_env")]
    pub log_level_env: String,

    #[serde(default = "default_train_log_level")]
    pub train_log_level: String,

    #[serde(default = "default_test_log_level")]
    pub test_log_level: String,

    /// Flag that passes the trial location to a script
    #[serde(default = "default_output_flag")]
    pub output_flag: String,

    /// Flag used instead of `output_flag` by the demo scripts below
    #[serde(default = "default_output_uri_flag")]
    pub output_uri_flag: String,

    /// Training scripts (by file name) that take `output_uri_flag` and no log level
    #[serde(default = "default_output_uri_scripts")]
    pub output_uri_scripts: Vec<String>,

    /// Seconds between two polling passes over running processes
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Directory processes run in; local trial paths are relative to it
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Per-run log files go here (disabled when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl RunnerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            log_level_env: default_log_level_env(),
            train_log_level: default_train_log_level(),
            test_log_level: default_test_log_level(),
            output_flag: default_output_flag(),
            output_uri_flag: default_output_uri_flag(),
            output_uri_scripts: default_output_uri_scripts(),
            poll_interval_secs: default_poll_interval_secs(),
            work_dir: default_work_dir(),
            log_dir: None,
        }
    }
}

fn default_interpreter() -> String {
    "python".to_string()
}

fn default_log_level_env() -> String {
    "TORNASOLE_LOG_LEVEL".to_string()
}

fn default_train_log_level() -> String {
    "info".to_string()
}

fn default_test_log_level() -> String {
    "debug".to_string()
}

fn default_output_flag() -> String {
    "--tornasole_path".to_string()
}

fn default_output_uri_flag() -> String {
    "--output-uri".to_string()
}

fn default_output_uri_scripts() -> Vec<String> {
    vec![
        "mnist_gluon_vg_demo.py".to_string(),
        "mnist_gluon_basic_hook_demo.py".to_string(),
    ]
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Validated configuration handed to the planner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Every job of the file, disabled ones included
    pub jobs: Vec<JobSpec>,

    /// Classified bases, local first
    pub output_bases: Vec<OutputBase>,

    pub runner: RunnerConfig,
}

impl HarnessConfig {
    /// Back to the on-disk shape
    pub fn to_document(&self) -> JobDocument {
        let mut outputs = OutputConfig::default();
        for base in &self.output_bases {
            if base.is_remote() {
                outputs.remote_base = base.to_string();
            } else {
                outputs.local_base = base.to_string();
            }
        }

        JobDocument {
            jobs: self.jobs.iter().map(JobEntry::from).collect(),
            outputs,
            runner: self.runner.clone(),
        }
    }
}
