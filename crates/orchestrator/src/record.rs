//! Process records and the liveness table

use std::time::{Duration, Instant};

use contracts::{LaunchDescriptor, TargetFunction};
use serde::Serialize;
use tokio::process::Child;
use tracing::{error, info, warn};

use crate::launcher::Launcher;

/// One launched (or failed-to-launch) process
///
/// Created at launch, updated by the polling loop, never recreated.
#[derive(Debug)]
pub struct ProcessRecord {
    descriptor: LaunchDescriptor,
    /// Handle until the process is reaped
    child: Option<Child>,
    /// False when the spawn itself failed
    started: bool,
    exit_code: Option<i32>,
    ended: bool,
    started_at: Instant,
    elapsed: Option<Duration>,
}

impl ProcessRecord {
    fn running(descriptor: LaunchDescriptor, child: Child) -> Self {
        Self {
            descriptor,
            child: Some(child),
            started: true,
            exit_code: None,
            ended: false,
            started_at: Instant::now(),
            elapsed: None,
        }
    }

    /// Spawn failed: nothing to wait for
    fn never_started(descriptor: LaunchDescriptor) -> Self {
        Self {
            descriptor,
            child: None,
            started: false,
            exit_code: None,
            ended: true,
            started_at: Instant::now(),
            elapsed: Some(Duration::ZERO),
        }
    }

    pub fn descriptor(&self) -> &LaunchDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// OS process id while the child is still held
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Check the child once; returns true if it ended during this call
    fn poll(&mut self) -> bool {
        if self.ended {
            return false;
        }
        let Some(child) = self.child.as_mut() else {
            self.finish(None);
            return true;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                self.finish(status.code());
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!(
                    process = %self.descriptor.name,
                    error = %e,
                    "failed to query process status"
                );
                self.abandon();
                true
            }
        }
    }

    /// End a record whose status can no longer be read
    ///
    /// The child is killed first so it cannot keep writing into a location
    /// that cleanup is about to remove.
    fn abandon(&mut self) {
        if let Some(child) = self.child.as_mut() {
            if let Err(e) = child.start_kill() {
                warn!(process = %self.descriptor.name, error = %e, "failed to kill process");
            }
        }
        self.finish(None);
    }

    /// Mark ended and release the handle; runs once per record
    fn finish(&mut self, exit_code: Option<i32>) {
        // reaped by try_wait or killed by abandon; dropping the handle frees it
        self.child.take();
        self.exit_code = exit_code;
        self.ended = true;
        self.elapsed = Some(self.started_at.elapsed());

        if exit_code == Some(0) {
            info!(process = %self.descriptor.name, exit_code = 0, "Process ended");
        } else {
            warn!(
                process = %self.descriptor.name,
                exit_code = ?exit_code,
                "Process ended with failure"
            );
        }
    }

    fn summary(&self) -> ProcessSummary {
        ProcessSummary {
            name: self.descriptor.name.clone(),
            target: self.descriptor.target,
            started: self.started,
            exit_code: self.exit_code,
            ended: self.ended,
            elapsed: self.elapsed.unwrap_or_else(|| self.started_at.elapsed()),
        }
    }
}

/// All records of one orchestration run; polled from a single task
#[derive(Debug, Default)]
pub struct ProcessTable {
    records: Vec<ProcessRecord>,
    ended: usize,
}

impl ProcessTable {
    /// Start every descriptor. A spawn failure ends that record immediately.
    pub fn launch_all<L: Launcher + ?Sized>(
        launcher: &L,
        descriptors: Vec<LaunchDescriptor>,
    ) -> Self {
        let mut table = Self::default();

        for descriptor in descriptors {
            let spawned = launcher
                .command(&descriptor)
                .and_then(|mut cmd| {
                    cmd.spawn().map_err(|source| crate::LaunchError::Spawn {
                        name: descriptor.name.clone(),
                        source,
                    })
                });

            let record = match spawned {
                Ok(child) => {
                    info!(process = %descriptor.name, pid = ?child.id(), "Process started");
                    ProcessRecord::running(descriptor, child)
                }
                Err(e) => {
                    error!(process = %descriptor.name, error = %e, "Process failed to start");
                    table.ended += 1;
                    ProcessRecord::never_started(descriptor)
                }
            };
            table.records.push(record);
        }

        table
    }

    /// One pass over every record that has not ended yet
    pub fn poll_once(&mut self) -> usize {
        let newly_ended = self
            .records
            .iter_mut()
            .filter(|record| !record.ended)
            .map(ProcessRecord::poll)
            .filter(|ended| *ended)
            .count();
        self.ended += newly_ended;
        newly_ended
    }

    pub fn all_ended(&self) -> bool {
        self.ended == self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ended_count(&self) -> usize {
        self.ended
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn into_report(self, duration: Duration) -> OrchestrationReport {
        OrchestrationReport {
            processes: self.records.iter().map(ProcessRecord::summary).collect(),
            duration,
        }
    }
}

/// Final state of one process
#[derive(Debug, Clone, Serialize)]
pub struct ProcessSummary {
    pub name: String,
    pub target: TargetFunction,
    pub started: bool,
    /// None when the process never started or was killed by a signal
    pub exit_code: Option<i32>,
    pub ended: bool,
    pub elapsed: Duration,
}

impl ProcessSummary {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Outcome of a full orchestration run
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchestrationReport {
    pub processes: Vec<ProcessSummary>,
    pub duration: Duration,
}

impl OrchestrationReport {
    pub fn launched(&self) -> usize {
        self.processes.len()
    }

    pub fn ended(&self) -> usize {
        self.processes.iter().filter(|p| p.ended).count()
    }

    pub fn succeeded(&self) -> usize {
        self.processes.iter().filter(|p| p.succeeded()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProcessSummary> {
        self.processes.iter().filter(|p| !p.succeeded())
    }

    pub fn all_succeeded(&self) -> bool {
        self.processes.iter().all(ProcessSummary::succeeded)
    }
}
