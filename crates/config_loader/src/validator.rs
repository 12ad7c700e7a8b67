//! Configuration validation
//!
//! Rules:
//! - script paths are non-empty
//! - the local base is a path and the remote base an `s3://` URI
//! - local bases are relative and stay below the working directory
//! - remote bases name a bucket and a key
//! - poll interval > 0
//! - interpreter is set

use std::path::Component;

use contracts::{HarnessConfig, HarnessError, OutputBase};

/// Validate a converted configuration
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &HarnessConfig) -> Result<(), HarnessError> {
    validate_scripts(config)?;
    validate_output_bases(config)?;
    validate_runner(config)?;
    Ok(())
}

/// Every job needs both scripts
fn validate_scripts(config: &HarnessConfig) -> Result<(), HarnessError> {
    for (idx, job) in config.jobs.iter().enumerate() {
        if job.train_script_path.as_os_str().is_empty() {
            return Err(HarnessError::config_validation(
                format!("jobs[{idx}].train_script_path"),
                "train script path cannot be empty",
            ));
        }
        if job.test_script_path.as_os_str().is_empty() {
            return Err(HarnessError::config_validation(
                format!("jobs[{idx}].test_script_path"),
                "test script path cannot be empty",
            ));
        }
    }
    Ok(())
}

/// Field each base comes from, in `HarnessConfig::output_bases` order
const BASE_FIELDS: [(&str, bool); 2] = [
    ("outputs.local_base", false),
    ("outputs.remote_base", true),
];

fn validate_output_bases(config: &HarnessConfig) -> Result<(), HarnessError> {
    if config.output_bases.len() != BASE_FIELDS.len() {
        return Err(HarnessError::config_validation(
            "outputs",
            format!(
                "expected a local and a remote base, got {} bases",
                config.output_bases.len()
            ),
        ));
    }

    for (base, (field, remote)) in config.output_bases.iter().zip(BASE_FIELDS) {
        if base.is_remote() != remote {
            let expected = if remote { "an s3:// URI" } else { "a local path" };
            return Err(HarnessError::config_validation(
                field,
                format!("must be {expected}, got '{base}'"),
            ));
        }

        match base {
            OutputBase::Local { path } => {
                // cleanup removes the top-level directory, which must not escape work_dir
                if path.is_absolute() {
                    return Err(HarnessError::config_validation(
                        field,
                        format!("local base must be relative, got '{}'", path.display()),
                    ));
                }
                if path.components().any(|c| matches!(c, Component::ParentDir)) {
                    return Err(HarnessError::config_validation(
                        field,
                        format!("local base cannot contain '..', got '{}'", path.display()),
                    ));
                }
                if !path.components().any(|c| matches!(c, Component::Normal(_))) {
                    return Err(HarnessError::config_validation(
                        field,
                        "local base cannot be empty",
                    ));
                }
            }
            OutputBase::Remote { bucket, key } => {
                if bucket.is_empty() {
                    return Err(HarnessError::config_validation(
                        field,
                        format!("missing bucket name in '{base}'"),
                    ));
                }
                if key.is_empty() {
                    return Err(HarnessError::config_validation(
                        field,
                        format!("missing key prefix in '{base}'"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_runner(config: &HarnessConfig) -> Result<(), HarnessError> {
    let runner = &config.runner;

    if runner.poll_interval_secs == 0 {
        return Err(HarnessError::config_validation(
            "runner.poll_interval_secs",
            "poll_interval_secs must be > 0",
        ));
    }

    if runner.interpreter.trim().is_empty() {
        return Err(HarnessError::config_validation(
            "runner.interpreter",
            "interpreter cannot be empty",
        ));
    }

    Ok(())
}
