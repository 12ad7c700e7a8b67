//! Command implementations.

mod plan;
mod run;
mod validate;
mod worker;

pub use plan::run_plan;
pub use run::run_harness;
pub use validate::run_validate;
pub use worker::{decode_task, run_worker};

use std::path::Path;

use anyhow::{Context, Result};
use contracts::HarnessConfig;

use crate::error::CliError;

/// Load and validate the job file, failing early when it is missing
fn load_config(path: &Path) -> Result<HarnessConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load job file {}", path.display()))
}
