//! Harness metrics
//!
//! Recorded through the `metrics` facade; a no-op unless an exporter is installed.

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// A process was started (or failed to start)
pub fn record_process_launched(target: &str, spawned: bool) {
    let status = if spawned { "started" } else { "spawn_failed" };
    counter!(
        "rule_harness_processes_launched_total",
        "target" => target.to_string(),
        "status" => status
    )
    .increment(1);
}

/// A process ended; `None` means it never started or died by signal
pub fn record_process_ended(target: &str, exit_code: Option<i32>) {
    let status = match exit_code {
        Some(0) => "success",
        Some(_) => "failure",
        None => "unknown",
    };
    counter!(
        "rule_harness_processes_ended_total",
        "target" => target.to_string(),
        "status" => status
    )
    .increment(1);
}

/// A stamped location was allocated
pub fn record_location_planned(kind: &str) {
    counter!("rule_harness_locations_planned_total", "kind" => kind.to_string()).increment(1);
}

/// Wall time of the launch-and-poll phase
pub fn record_run_duration(duration: Duration) {
    histogram!("rule_harness_run_duration_seconds").record(duration.as_secs_f64());
}

/// Outcome of one cleanup pass
pub fn record_cleanup(local_removed: usize, remote_deleted: usize, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("rule_harness_cleanups_total", "status" => status).increment(1);
    gauge!("rule_harness_cleanup_local_removed").set(local_removed as f64);
    gauge!("rule_harness_cleanup_remote_deleted").set(remote_deleted as f64);
}
