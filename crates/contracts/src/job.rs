//! Job definitions - Config Loader output
//!
//! A job is a (train-script, test-script) pair tagged with one ML framework.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::HarnessError;

/// ML framework a job belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Tensorflow,
    Mxnet,
    Pytorch,
    /// Reserved category. Accepted by the loader, never executed.
    Values,
}

impl Framework {
    /// All recognized tags, in declaration order
    pub const ALL: [Framework; 4] = [
        Framework::Tensorflow,
        Framework::Mxnet,
        Framework::Pytorch,
        Framework::Values,
    ];

    /// Tag as written in the job file
    pub fn as_str(self) -> &'static str {
        match self {
            Framework::Tensorflow => "tensorflow",
            Framework::Mxnet => "mxnet",
            Framework::Pytorch => "pytorch",
            Framework::Values => "values",
        }
    }

    /// Whether jobs with this tag can ever be scheduled
    pub fn is_executable(self) -> bool {
        !matches!(self, Framework::Values)
    }

    /// Whether a job tagged `self` runs under the requested `mode`
    ///
    /// `values` never matches, not even itself.
    pub fn matches(self, mode: Framework) -> bool {
        self.is_executable() && self == mode
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag that is none of the recognized frameworks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized framework tag '{0}'")]
pub struct ParseFrameworkError(pub String);

impl FromStr for Framework {
    type Err = ParseFrameworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Framework::ALL
            .into_iter()
            .find(|framework| framework.as_str() == s)
            .ok_or_else(|| ParseFrameworkError(s.to_string()))
    }
}

/// Job entry exactly as it appears in the job file:
/// `[framework-tag, enabled, [train_script, train_args, test_script, test_args]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEntry(pub String, pub bool, pub (String, String, String, String));

/// Validated, immutable job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub framework: Framework,
    pub enabled: bool,
    pub train_script_path: PathBuf,
    pub train_args: String,
    pub test_script_path: PathBuf,
    pub test_args: String,
}

impl JobSpec {
    /// Convert a raw entry, rejecting unknown framework tags
    pub fn from_entry(index: usize, entry: &JobEntry) -> Result<Self, HarnessError> {
        let JobEntry(tag, enabled, (train, train_args, test, test_args)) = entry;
        let framework = tag
            .parse::<Framework>()
            .map_err(|e| HarnessError::UnknownFramework { index, tag: e.0 })?;

        Ok(Self {
            framework,
            enabled: *enabled,
            train_script_path: PathBuf::from(train),
            train_args: train_args.clone(),
            test_script_path: PathBuf::from(test),
            test_args: test_args.clone(),
        })
    }

    /// The (train, test) tuple handed to launched processes
    pub fn scripts(&self) -> ScriptPair {
        ScriptPair {
            train_script: self.train_script_path.clone(),
            train_args: self.train_args.clone(),
            test_script: self.test_script_path.clone(),
            test_args: self.test_args.clone(),
        }
    }
}

impl From<&JobSpec> for JobEntry {
    fn from(job: &JobSpec) -> Self {
        JobEntry(
            job.framework.to_string(),
            job.enabled,
            (
                job.train_script_path.display().to_string(),
                job.train_args.clone(),
                job.test_script_path.display().to_string(),
                job.test_args.clone(),
            ),
        )
    }
}

/// Scripts and argument strings of one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPair {
    pub train_script: PathBuf,
    pub train_args: String,
    pub test_script: PathBuf,
    pub test_args: String,
}

impl ScriptPair {
    /// File stem of the training script (`mnist_train` for `tests/mnist_train.py`)
    pub fn train_stem(&self) -> String {
        script_stem(&self.train_script)
    }

    /// File stem of the test script
    pub fn test_stem(&self) -> String {
        script_stem(&self.test_script)
    }
}

fn script_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
