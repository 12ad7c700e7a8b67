//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{Framework, HarnessConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    job_count: usize,
    enabled_count: usize,
    /// Enabled jobs per framework tag
    enabled_by_framework: Vec<(String, usize)>,
    output_bases: Vec<String>,
    interpreter: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating job file");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Job file validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(summarize(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(config: &HarnessConfig) -> ConfigSummary {
    let enabled_by_framework = Framework::ALL
        .iter()
        .map(|framework| {
            let count = config
                .jobs
                .iter()
                .filter(|job| job.enabled && job.framework == *framework)
                .count();
            (framework.to_string(), count)
        })
        .collect();

    ConfigSummary {
        job_count: config.jobs.len(),
        enabled_count: config.jobs.iter().filter(|job| job.enabled).count(),
        enabled_by_framework,
        output_bases: config.output_bases.iter().map(ToString::to_string).collect(),
        interpreter: config.runner.interpreter.clone(),
    }
}

/// Non-fatal issues
fn collect_warnings(config: &HarnessConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.jobs.iter().any(|job| job.enabled) {
        warnings.push("No job is enabled - nothing will be launched".to_string());
    }

    let values_jobs = config
        .jobs
        .iter()
        .filter(|job| job.framework == Framework::Values)
        .count();
    if values_jobs > 0 {
        warnings.push(format!(
            "{} 'values' job(s) present - they are never executed",
            values_jobs
        ));
    }

    if config.runner.log_dir.is_none() {
        warnings.push("runner.log_dir is not set - no per-process log files".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Job file is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Jobs: {} ({} enabled)", summary.job_count, summary.enabled_count);
            for (framework, count) in &summary.enabled_by_framework {
                println!("    {}: {}", framework, count);
            }
            println!("  Output bases: {}", summary.output_bases.join(", "));
            println!("  Interpreter: {}", summary.interpreter);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Job file is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_warnings_for_values_and_disabled() {
        let file = write_config(
            r#"
jobs = [
    ["values", true, ["a.py", "", "b.py", ""]],
    ["tensorflow", false, ["c.py", "", "d.py", ""]],
]
"#,
        );
        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        });

        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("'values'")));
        let summary = result.summary.unwrap();
        assert_eq!(summary.job_count, 2);
        assert_eq!(summary.enabled_count, 1);
    }

    #[test]
    fn test_unknown_tag_is_invalid() {
        let file = write_config(r#"jobs = [["caffe", true, ["a.py", "", "b.py", ""]]]"#);
        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("caffe"));
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(&ValidateArgs {
            config: "/nonexistent/jobs.toml".into(),
            json: false,
        });
        assert!(!result.valid);
    }
}
