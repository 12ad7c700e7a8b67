//! `plan` command implementation.

use anyhow::{Context, Result};
use contracts::Framework;
use planner::{ExecutionPlan, ExecutionPlanner};
use tracing::info;

use super::load_config;
use crate::cli::PlanArgs;

/// Execute the `plan` command
pub fn run_plan(args: &PlanArgs) -> Result<()> {
    info!(config = %args.config.display(), "Planning job file");

    let config = load_config(&args.config)?;
    let plan =
        ExecutionPlanner::from_config(Framework::from(args.mode), &config).plan(&config.jobs);

    if args.json {
        let json = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
        println!("{}", json);
    } else {
        print_plan(&plan);
    }

    Ok(())
}

/// Human-readable plan
pub(crate) fn print_plan(plan: &ExecutionPlan) {
    println!("\n=== Launch Plan ===\n");
    println!("Processes ({}):", plan.descriptors.len());
    for descriptor in &plan.descriptors {
        println!("  - [{}] {}", descriptor.target, descriptor.name);
    }

    println!("\nLocal locations ({}):", plan.locations.local.len());
    for local in &plan.locations.local {
        println!(
            "  - {} (removes {})",
            local.path.display(),
            local.top_level.display()
        );
    }

    println!("\nRemote locations ({}):", plan.locations.remote.len());
    for remote in &plan.locations.remote {
        println!("  - s3://{}/{}", remote.bucket, remote.prefix);
    }

    println!();
}
