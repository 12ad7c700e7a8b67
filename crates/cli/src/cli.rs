//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use contracts::Framework;

use crate::pipeline::StoreBackend;

/// Rule harness - runs hook rule scripts across execution configurations
#[derive(Parser, Debug)]
#[command(
    name = "rule-harness",
    author,
    version,
    about = "Integration harness for ML hook rule scripts",
    long_about = "Runs every enabled (train, test) script pair of a job file serially and \n\
                  in parallel, against a local and a remote output location, then removes \n\
                  every trial the scripts wrote."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RULE_HARNESS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RULE_HARNESS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "RULE_HARNESS_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default filter level from -v / -q
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Global flags repeated on every worker command line
    pub fn worker_args(&self) -> Vec<String> {
        let mut args = vec![
            "--log-format".to_string(),
            self.log_format.as_str().to_string(),
        ];
        if self.quiet {
            args.push("--quiet".to_string());
        } else if self.verbose > 0 {
            args.push(format!("-{}", "v".repeat(self.verbose as usize)));
        }
        args
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan, run and clean up every matching job
    Run(RunArgs),

    /// Print the launch plan without running anything
    Plan(PlanArgs),

    /// Validate a job file without running
    Validate(ValidateArgs),

    /// Run one target function (used by `run` for each launched process)
    #[command(hide = true)]
    Worker(WorkerArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Framework whose jobs are run
    #[arg(short, long, value_enum, env = "RULE_HARNESS_MODE")]
    pub mode: RunMode,

    /// Path to the job file (TOML, JSON or YAML)
    #[arg(short, long, default_value = "jobs.toml", env = "RULE_HARNESS_CONFIG")]
    pub config: PathBuf,

    /// Clean remote trials from buckets mounted under this directory instead of S3
    #[arg(long, env = "RULE_HARNESS_STORE_ROOT", conflicts_with = "s3_endpoint")]
    pub store_root: Option<PathBuf>,

    /// S3-compatible endpoint URL (defaults to AWS)
    #[arg(long, env = "RULE_HARNESS_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Load and plan, print the plan and exit without launching
    #[arg(long)]
    pub dry_run: bool,

    /// Fail the command when any process exited non-zero
    #[arg(long, env = "RULE_HARNESS_STRICT")]
    pub strict: bool,
}

impl RunArgs {
    /// Object store the run cleans remote trials from
    pub fn store_backend(&self) -> StoreBackend {
        match &self.store_root {
            Some(root) => StoreBackend::Mounted(root.clone()),
            None => StoreBackend::S3 {
                endpoint: self.s3_endpoint.clone(),
            },
        }
    }
}

/// Arguments for the `plan` command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Path to the job file
    #[arg(short, long, default_value = "jobs.toml")]
    pub config: PathBuf,

    /// Framework whose jobs are planned
    #[arg(short, long, value_enum)]
    pub mode: RunMode,

    /// Output the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the job file to validate
    #[arg(short, long, default_value = "jobs.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the hidden `worker` command
#[derive(Parser, Debug)]
pub struct WorkerArgs {
    /// JSON-encoded worker task
    #[arg(long)]
    pub task: String,
}

/// Run mode; `values` jobs are never executable so it is not offered
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Tensorflow,
    Mxnet,
    Pytorch,
}

impl From<RunMode> for Framework {
    fn from(mode: RunMode) -> Self {
        match mode {
            RunMode::Tensorflow => Framework::Tensorflow,
            RunMode::Mxnet => Framework::Mxnet,
            RunMode::Pytorch => Framework::Pytorch,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
        }
    }
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
