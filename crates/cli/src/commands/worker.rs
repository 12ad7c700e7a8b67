//! Hidden `worker` command: runs inside each launched process.

use contracts::WorkerTask;
use tracing::error;

use crate::error::CliError;

/// Decode the task argument
pub fn decode_task(raw: &str) -> Result<WorkerTask, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::invalid_task(e.to_string()))
}

/// Run the task's target function and return the exit code for this process
pub async fn run_worker(task: &WorkerTask) -> i32 {
    match orchestrator::run_target(task).await {
        Ok(code) => code,
        Err(e) => {
            error!(process = %task.name, error = %e, "Worker failed");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_task("not json").is_err());
    }

    #[tokio::test]
    async fn test_missing_script_exits_nonzero() {
        let task = WorkerTask {
            name: "missing".into(),
            target: contracts::TargetFunction::RunTrainOnly,
            args: contracts::ScriptPair {
                train_script: "/nonexistent/train.sh".into(),
                train_args: String::new(),
                test_script: "/nonexistent/test.sh".into(),
                test_args: String::new(),
            },
            output: contracts::OutputBase::parse("trial").stamped("1"),
            runner: contracts::RunnerConfig {
                interpreter: "sh".into(),
                ..Default::default()
            },
            log_file: None,
        };
        assert_ne!(run_worker(&task).await, 0);
    }
}
