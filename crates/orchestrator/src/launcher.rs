//! Process launchers
//!
//! A launcher turns a descriptor into an OS command. Running each target
//! function in a separate process keeps the scripts' process-wide state
//! (environment, logging handlers, framework globals) apart.

use std::path::PathBuf;

use contracts::{LaunchDescriptor, RunnerConfig, WorkerTask};
use tokio::process::Command;

use crate::error::{LaunchError, Result};

/// Subcommand the harness binary exposes for launched processes
pub const WORKER_SUBCOMMAND: &str = "worker";

/// Builds the command for one descriptor
pub trait Launcher: Send + Sync {
    fn command(&self, descriptor: &LaunchDescriptor) -> Result<Command>;
}

/// Re-invokes the harness binary as `<program> worker --task <json>`
#[derive(Debug, Clone)]
pub struct SelfExecLauncher {
    program: PathBuf,
    /// Global flags placed before the subcommand (log format, verbosity)
    leading_args: Vec<String>,
    runner: RunnerConfig,
}

impl SelfExecLauncher {
    pub fn new(program: impl Into<PathBuf>, runner: RunnerConfig) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            runner,
        }
    }

    /// Launcher for the currently running executable
    pub fn current_exe(runner: RunnerConfig) -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?, runner))
    }

    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }
}

impl Launcher for SelfExecLauncher {
    fn command(&self, descriptor: &LaunchDescriptor) -> Result<Command> {
        let task = WorkerTask::from_descriptor(descriptor, &self.runner);
        let encoded = serde_json::to_string(&task).map_err(|source| LaunchError::Encode {
            name: descriptor.name.clone(),
            source,
        })?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .arg(WORKER_SUBCOMMAND)
            .arg("--task")
            .arg(encoded)
            .current_dir(&self.runner.work_dir);
        Ok(cmd)
    }
}
