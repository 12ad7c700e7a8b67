//! Job file parsing
//!
//! TOML is the primary format. JSON and YAML are accepted as well, either as
//! the keyed document or as a bare list of job entries.

use contracts::{HarnessError, JobDocument, JobFile};

/// Job file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

impl ConfigFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parse a TOML job file
pub fn parse_toml(content: &str) -> Result<JobDocument, HarnessError> {
    toml::from_str(content).map_err(|e| HarnessError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON job file
pub fn parse_json(content: &str) -> Result<JobDocument, HarnessError> {
    serde_json::from_str::<JobFile>(content)
        .map(JobDocument::from)
        .map_err(|e| HarnessError::ConfigParse {
            message: format!("JSON parse error: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Parse a YAML job file
pub fn parse_yaml(content: &str) -> Result<JobDocument, HarnessError> {
    serde_yaml::from_str::<JobFile>(content)
        .map(JobDocument::from)
        .map_err(|e| HarnessError::ConfigParse {
            message: format!("YAML parse error: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Parse according to `format`
pub fn parse(content: &str, format: ConfigFormat) -> Result<JobDocument, HarnessError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
        ConfigFormat::Yaml => parse_yaml(content),
    }
}
