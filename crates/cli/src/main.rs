//! # Rule Harness CLI
//!
//! Entry point for the `rule-harness` binary.
//!
//! Provides:
//! - Job file validation and plan inspection
//! - A full run: launch every configuration, wait, clean up
//! - The hidden `worker` subcommand each launched process runs

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{decode_task, run_harness, run_plan, run_validate, run_worker};
use observability::ObservabilityConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(args) => {
            init_driver_logging(&cli)?;
            run_harness(args, cli.worker_args()).await
        }
        Commands::Plan(args) => {
            init_driver_logging(&cli)?;
            run_plan(args)
        }
        Commands::Validate(args) => {
            init_driver_logging(&cli)?;
            run_validate(args)
        }
        Commands::Worker(args) => {
            let task = decode_task(&args.task)?;
            init_logging(&cli, task.log_file.clone(), None)?;
            let code = run_worker(&task).await;
            std::process::exit(code);
        }
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Logging for the driver commands, with the optional metrics endpoint
fn init_driver_logging(cli: &Cli) -> Result<()> {
    let metrics_port = (cli.metrics_port != 0).then_some(cli.metrics_port);
    init_logging(cli, None, metrics_port)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Rule harness starting");
    Ok(())
}

/// Initialize logging based on CLI options
fn init_logging(
    cli: &Cli,
    log_file: Option<std::path::PathBuf>,
    metrics_port: Option<u16>,
) -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port,
        default_log_level: cli.default_log_level().to_string(),
        log_file,
    })
}
