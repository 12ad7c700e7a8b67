//! Launch descriptors - Planner output, Orchestrator input

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::{OutputLocation, RunnerConfig, ScriptPair};

/// Function a launched process executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFunction {
    /// Train, then test, inside one process
    RunSerialPair,
    /// Training script only
    RunTrainOnly,
    /// Test script only
    RunTestOnly,
}

impl TargetFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetFunction::RunSerialPair => "run_serial_pair",
            TargetFunction::RunTrainOnly => "run_train_only",
            TargetFunction::RunTestOnly => "run_test_only",
        }
    }

    /// `serial` or `parallel`
    pub fn mode_label(self) -> &'static str {
        match self {
            TargetFunction::RunSerialPair => "serial",
            TargetFunction::RunTrainOnly | TargetFunction::RunTestOnly => "parallel",
        }
    }
}

impl fmt::Display for TargetFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One process to launch. Created by the planner, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    /// Identification for logs
    pub name: String,
    pub target: TargetFunction,
    pub args: ScriptPair,
    pub output_location: OutputLocation,
}

impl LaunchDescriptor {
    pub fn new(target: TargetFunction, args: ScriptPair, output_location: OutputLocation) -> Self {
        let name = match target {
            TargetFunction::RunSerialPair => format!(
                "serial_{}_{}_{}_serial",
                args.train_script.display(),
                args.test_script.display(),
                output_location
            ),
            TargetFunction::RunTrainOnly => format!(
                "train_parallel_{}_{}",
                args.train_script.display(),
                output_location
            ),
            TargetFunction::RunTestOnly => format!(
                "test_parallel_{}_{}",
                args.test_script.display(),
                output_location
            ),
        };

        Self {
            name,
            target,
            args,
            output_location,
        }
    }

    /// Per-run log file name: `<train>_<test>_<local|s3>_<serial|parallel>.log`
    ///
    /// Both halves of a parallel run share one file.
    pub fn log_file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}.log",
            self.args.train_stem(),
            self.args.test_stem(),
            self.output_location.label(),
            self.target.mode_label()
        )
    }
}

/// Everything a worker process needs to run one target function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerTask {
    pub name: String,
    pub target: TargetFunction,
    pub args: ScriptPair,
    pub output: OutputLocation,
    pub runner: RunnerConfig,
    /// Append this process's log records here as well
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl WorkerTask {
    pub fn from_descriptor(descriptor: &LaunchDescriptor, runner: &RunnerConfig) -> Self {
        let log_file = runner
            .log_dir
            .as_ref()
            .map(|dir| dir.join(descriptor.log_file_name()));

        Self {
            name: descriptor.name.clone(),
            target: descriptor.target,
            args: descriptor.args.clone(),
            output: descriptor.output_location.clone(),
            runner: runner.clone(),
            log_file,
        }
    }
}
