//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::Framework;
use tracing::{info, warn};

use super::load_config;
use super::plan::print_plan;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Harness, HarnessRunConfig};

/// Execute the `run` command
pub async fn run_harness(args: &RunArgs, worker_args: Vec<String>) -> Result<()> {
    info!(config = %args.config.display(), "Loading job file");

    let config = load_config(&args.config)?;
    let mode = Framework::from(args.mode);

    info!(
        mode = %mode,
        jobs = config.jobs.len(),
        work_dir = %config.runner.work_dir.display(),
        "Job file loaded"
    );

    let harness = Harness::new(HarnessRunConfig {
        config,
        mode,
        store: args.store_backend(),
        worker_args,
    });

    // Dry run - plan only
    if args.dry_run {
        info!("Dry run mode - printing plan, nothing is launched");
        print_plan(&harness.plan());
        return Ok(());
    }

    let stats = harness.run().await.context("Harness run failed")?;

    info!(
        processes = stats.orchestration.launched(),
        failed = stats.failed(),
        duration_secs = stats.duration.as_secs_f64(),
        "Harness run completed"
    );
    stats.print_summary();

    if stats.failed() > 0 {
        warn!(failed = stats.failed(), "Some processes exited with failure");
        if args.strict {
            return Err(CliError::ProcessFailures {
                failed: stats.failed(),
                total: stats.orchestration.launched(),
            }
            .into());
        }
    }

    Ok(())
}
