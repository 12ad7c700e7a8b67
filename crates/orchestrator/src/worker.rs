//! Target functions run inside a launched process
//!
//! Each phase shells out to `<interpreter> <script> <flag> <output> <args>`,
//! with the shell replaced by the interpreter.
//! The fixed parts are passed as positional parameters so only the free-form
//! argument string is word-split by the shell.

use std::path::Path;

use contracts::{TargetFunction, WorkerTask};
use tokio::process::Command;
use tracing::{info, instrument, warn};

use crate::error::{LaunchError, Result};

/// Which script of the pair to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPhase {
    Train,
    Test,
}

impl ScriptPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptPhase::Train => "training",
            ScriptPhase::Test => "testing",
        }
    }
}

/// Build the shell command for one phase of `task`
pub fn script_command(phase: ScriptPhase, task: &WorkerTask) -> Command {
    let runner = &task.runner;
    let (script, args, level) = match phase {
        ScriptPhase::Train => (
            &task.args.train_script,
            &task.args.train_args,
            &runner.train_log_level,
        ),
        ScriptPhase::Test => (
            &task.args.test_script,
            &task.args.test_args,
            &runner.test_log_level,
        ),
    };

    let uses_output_uri =
        phase == ScriptPhase::Train && takes_output_uri(script, &runner.output_uri_scripts);
    let flag = if uses_output_uri {
        &runner.output_uri_flag
    } else {
        &runner.output_flag
    };

    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(format!("exec \"$@\" {args}"))
        .arg("sh")
        .arg(&runner.interpreter)
        .arg(script)
        .arg(flag)
        .arg(task.output.to_string());

    if !uses_output_uri {
        cmd.env(&runner.log_level_env, level);
    }
    cmd
}

fn takes_output_uri(script: &Path, listed: &[String]) -> bool {
    script
        .file_name()
        .map(|name| listed.iter().any(|s| name == s.as_str()))
        .unwrap_or(false)
}

/// Run one phase and return its exit code; a signal death counts as 1
async fn run_phase(phase: ScriptPhase, task: &WorkerTask) -> Result<i32> {
    let script = match phase {
        ScriptPhase::Train => &task.args.train_script,
        ScriptPhase::Test => &task.args.test_script,
    };
    info!(
        script = %script.display(),
        output = %task.output,
        "running {} script",
        phase.as_str()
    );

    let status = script_command(phase, task)
        .status()
        .await
        .map_err(|source| LaunchError::Script {
            phase: phase.as_str(),
            script: script.display().to_string(),
            source,
        })?;

    let code = status.code().unwrap_or(1);
    if code != 0 {
        warn!(script = %script.display(), exit_code = code, "{} script failed", phase.as_str());
    }
    Ok(code)
}

/// Execute the task's target function and return the process exit code
#[instrument(name = "worker_run", skip(task), fields(process = %task.name, target = %task.target))]
pub async fn run_target(task: &WorkerTask) -> Result<i32> {
    match task.target {
        TargetFunction::RunTrainOnly => {
            let code = run_phase(ScriptPhase::Train, task).await?;
            info!(exit_code = code, "Finished training job");
            Ok(code)
        }
        TargetFunction::RunTestOnly => {
            let code = run_phase(ScriptPhase::Test, task).await?;
            info!(exit_code = code, "Finished testing job");
            Ok(code)
        }
        TargetFunction::RunSerialPair => {
            let train = run_phase(ScriptPhase::Train, task).await?;
            info!(exit_code = train, "Finished training job");
            let test = run_phase(ScriptPhase::Test, task).await?;
            info!(exit_code = test, "Finished testing job");

            let code = if train != 0 { train } else { test };
            info!(exit_code = code, "Finished Serial training and testing job");
            Ok(code)
        }
    }
}
