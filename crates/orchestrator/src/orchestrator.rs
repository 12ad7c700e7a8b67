//! Launch-and-poll loop

use std::time::{Duration, Instant};

use contracts::LaunchDescriptor;
use tracing::{debug, info, instrument};

use crate::launcher::Launcher;
use crate::record::{OrchestrationReport, ProcessTable};

/// Pause between two polling passes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Runs a batch of descriptors to completion
///
/// There is no timeout and no cancellation: a child that never exits keeps
/// [`Orchestrator::run`] waiting.
pub struct Orchestrator<L: Launcher> {
    launcher: L,
    poll_interval: Duration,
}

impl<L: Launcher> Orchestrator<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Launch everything, then poll until every process has ended
    ///
    /// Failed processes are logged and counted; they never stop the loop.
    #[instrument(
        name = "orchestrator_run",
        skip(self, descriptors),
        fields(processes = descriptors.len())
    )]
    pub async fn run(&self, descriptors: Vec<LaunchDescriptor>) -> OrchestrationReport {
        let start = Instant::now();
        let mut table = ProcessTable::launch_all(&self.launcher, descriptors);
        info!(launched = table.len(), "all processes launched");

        loop {
            let newly_ended = table.poll_once();
            if newly_ended > 0 {
                debug!(
                    ended = table.ended_count(),
                    total = table.len(),
                    "polling pass"
                );
            }
            if table.all_ended() {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        let report = table.into_report(start.elapsed());
        info!(
            ended = report.ended(),
            succeeded = report.succeeded(),
            duration_secs = report.duration.as_secs_f64(),
            "all processes ended"
        );
        report
    }
}
