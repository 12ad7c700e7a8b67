//! Run statistics.

use std::time::Duration;

use cleanup::CleanupReport;
use orchestrator::OrchestrationReport;

/// Statistics from a harness run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Jobs enabled for the selected mode
    pub jobs_planned: usize,

    /// Per-process outcome
    pub orchestration: OrchestrationReport,

    /// What cleanup removed
    pub cleanup: CleanupReport,

    /// Total duration of the run
    pub duration: Duration,
}

impl RunStats {
    pub fn failed(&self) -> usize {
        self.orchestration.launched() - self.orchestration.succeeded()
    }

    /// Success rate as percentage
    pub fn success_rate(&self) -> f64 {
        let launched = self.orchestration.launched();
        if launched > 0 {
            (self.orchestration.succeeded() as f64 / launched as f64) * 100.0
        } else {
            100.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Harness Statistics ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Jobs: {}", self.jobs_planned);
        println!("   ├─ Processes launched: {}", self.orchestration.launched());
        println!("   ├─ Processes ended: {}", self.orchestration.ended());
        println!(
            "   └─ Succeeded: {} ({:.1}%)",
            self.orchestration.succeeded(),
            self.success_rate()
        );

        let failures: Vec<_> = self.orchestration.failures().collect();
        if !failures.is_empty() {
            println!("\nFailed Processes");
            for process in failures {
                let code = process
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string());
                println!("   ├─ {} (exit code {})", process.name, code);
            }
        }

        println!("\nCleanup");
        println!("   ├─ Local directories removed: {}", self.cleanup.local_removed);
        println!("   ├─ Remote prefixes listed: {}", self.cleanup.remote_prefixes);
        println!("   └─ Remote objects deleted: {}", self.cleanup.remote_deleted);

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::TargetFunction;
    use orchestrator::ProcessSummary;

    fn process(exit_code: Option<i32>) -> ProcessSummary {
        ProcessSummary {
            name: "p".into(),
            target: TargetFunction::RunTrainOnly,
            started: true,
            exit_code,
            ended: true,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_success_rate() {
        let stats = RunStats {
            orchestration: OrchestrationReport {
                processes: vec![
                    process(Some(0)),
                    process(Some(2)),
                    process(None),
                    process(Some(0)),
                ],
                duration: Duration::ZERO,
            },
            ..Default::default()
        };
        assert_eq!(stats.failed(), 2);
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_run_is_fully_successful() {
        let stats = RunStats::default();
        assert_eq!(stats.failed(), 0);
        assert!((stats.success_rate() - 100.0).abs() < f64::EPSILON);
    }
}
