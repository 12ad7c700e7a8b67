//! # Config Loader
//!
//! Job Spec Loader.
//!
//! Responsibilities:
//! - Parse TOML/JSON/YAML job files
//! - Reject unrecognized framework tags before anything runs
//! - Validate the remaining settings
//! - Produce a `HarnessConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("jobs.toml")).unwrap();
//! println!("jobs: {}", config.jobs.len());
//! ```

mod parser;
mod validator;

pub use contracts::HarnessConfig;
pub use parser::ConfigFormat;

use contracts::{HarnessError, JobDocument, JobSpec, OutputBase};
use std::path::Path;
use tracing::debug;

/// Job file loader
///
/// Provides static methods to load a job file from disk or from a string.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a job file
    ///
    /// Format is detected from the extension (.toml / .json / .yaml / .yml).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Unknown framework tag
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<HarnessConfig, HarnessError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a job file from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Unknown framework tag
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<HarnessConfig, HarnessError> {
        let document = parser::parse(content, format)?;
        let config = Self::convert(&document)?;
        validator::validate(&config)?;
        debug!(jobs = config.jobs.len(), "job file loaded");
        Ok(config)
    }

    /// Serialize a configuration back to TOML
    pub fn to_toml(config: &HarnessConfig) -> Result<String, HarnessError> {
        toml::to_string_pretty(&config.to_document())
            .map_err(|e| HarnessError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a configuration back to JSON
    pub fn to_json(config: &HarnessConfig) -> Result<String, HarnessError> {
        serde_json::to_string_pretty(&config.to_document())
            .map_err(|e| HarnessError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, HarnessError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            HarnessError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            HarnessError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, HarnessError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Turn raw entries into typed jobs; the first bad tag aborts the load
    fn convert(document: &JobDocument) -> Result<HarnessConfig, HarnessError> {
        let jobs = document
            .jobs
            .iter()
            .enumerate()
            .map(|(idx, entry)| JobSpec::from_entry(idx, entry))
            .collect::<Result<Vec<_>, _>>()?;

        let output_bases = vec![
            OutputBase::parse(&document.outputs.local_base),
            OutputBase::parse(&document.outputs.remote_base),
        ];

        Ok(HarnessConfig {
            jobs,
            output_bases,
            runner: document.runner.clone(),
        })
    }
}
