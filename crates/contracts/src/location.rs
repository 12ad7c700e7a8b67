//! Output locations
//!
//! A base is classified as local or remote once, when the job file is loaded.
//! Stamping a base yields a unique [`OutputLocation`] that keeps its tag, so
//! cleanup never has to sniff string prefixes again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fmt;
use std::path::{Component, PathBuf};

/// URI scheme that marks a remote object-store base
pub const REMOTE_SCHEME: &str = "s3://";

/// Configured base path or URI, before stamping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputBase {
    /// Directory path relative to the harness working directory
    Local { path: PathBuf },
    /// `s3://<bucket>/<key>`
    Remote { bucket: String, key: String },
}

impl OutputBase {
    /// Classify a raw base by its scheme
    ///
    /// Anything that does not start with `s3://` is a local path. Shape checks
    /// (empty bucket, absolute path, ...) belong to the validator.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(REMOTE_SCHEME) {
            Some(rest) => {
                let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
                Self::Remote {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                }
            }
            None => Self::Local {
                path: PathBuf::from(raw),
            },
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Append `stamp` to the last segment of the base
    pub fn stamped(&self, stamp: &str) -> OutputLocation {
        match self {
            Self::Local { path } => {
                let mut raw = OsString::from(path.as_os_str());
                raw.push(stamp);
                let stamped = PathBuf::from(raw);

                let mut normals = path.components().filter_map(|c| match c {
                    Component::Normal(part) => Some(part),
                    _ => None,
                });
                let top_level = match (normals.next(), normals.next()) {
                    (Some(first), Some(_)) => PathBuf::from(first),
                    _ => stamped.clone(),
                };

                OutputLocation::Local(LocalLocation {
                    path: stamped,
                    top_level,
                })
            }
            Self::Remote { bucket, key } => OutputLocation::Remote(RemoteLocation {
                bucket: bucket.clone(),
                prefix: format!("{key}{stamp}"),
            }),
        }
    }
}

impl fmt::Display for OutputBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { path } => write!(f, "{}", path.display()),
            Self::Remote { bucket, key } => write!(f, "{REMOTE_SCHEME}{bucket}/{key}"),
        }
    }
}

/// Stamped local trial directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalLocation {
    /// Trial directory the scripts write into
    pub path: PathBuf,
    /// Top-level directory removed at cleanup time
    pub top_level: PathBuf,
}

/// Stamped remote trial prefix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RemoteLocation {
    pub bucket: String,
    pub prefix: String,
}

/// Where a single run writes its artifacts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputLocation {
    Local(LocalLocation),
    Remote(RemoteLocation),
}

impl OutputLocation {
    /// Short label used in log file names
    pub fn label(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "s3",
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(local) => write!(f, "{}", local.path.display()),
            Self::Remote(remote) => {
                write!(f, "{REMOTE_SCHEME}{}/{}", remote.bucket, remote.prefix)
            }
        }
    }
}

/// Every location produced by one planning pass, split by kind
///
/// Filled while planning and moved into the cleanup engine afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputLocations {
    pub local: BTreeSet<LocalLocation>,
    pub remote: BTreeSet<RemoteLocation>,
}

impl OutputLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a location; returns false if it was already tracked
    pub fn insert(&mut self, location: OutputLocation) -> bool {
        match location {
            OutputLocation::Local(local) => self.local.insert(local),
            OutputLocation::Remote(remote) => self.remote.insert(remote),
        }
    }

    pub fn len(&self) -> usize {
        self.local.len() + self.remote.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classifies_by_scheme() {
        assert_eq!(
            OutputBase::parse("s3://tornasolecodebuildtest/trial"),
            OutputBase::Remote {
                bucket: "tornasolecodebuildtest".into(),
                key: "trial".into()
            }
        );
        assert_eq!(
            OutputBase::parse("./local_test/trial"),
            OutputBase::Local {
                path: PathBuf::from("./local_test/trial")
            }
        );
        assert_eq!(
            OutputBase::parse("s3://bucket-only"),
            OutputBase::Remote {
                bucket: "bucket-only".into(),
                key: String::new()
            }
        );
    }

    #[test]
    fn test_stamp_local() {
        let base = OutputBase::parse("./local_test/trial");
        let OutputLocation::Local(local) = base.stamped("1700000000.000001") else {
            panic!("expected local location");
        };
        assert_eq!(local.path, PathBuf::from("./local_test/trial1700000000.000001"));
        assert_eq!(local.top_level, PathBuf::from("local_test"));
    }

    #[test]
    fn test_stamp_local_single_component() {
        let base = OutputBase::parse("trial");
        let OutputLocation::Local(local) = base.stamped("42") else {
            panic!("expected local location");
        };
        assert_eq!(local.top_level, local.path);
        assert_eq!(local.path, PathBuf::from("trial42"));
    }

    #[test]
    fn test_stamp_remote_display() {
        let base = OutputBase::parse("s3://bucket/nested/trial");
        let location = base.stamped("7.5");
        assert_eq!(location.to_string(), "s3://bucket/nested/trial7.5");
        assert_eq!(location.label(), "s3");
        assert_eq!(base.to_string(), "s3://bucket/nested/trial");
    }

    #[test]
    fn test_locations_partition() {
        let mut locations = OutputLocations::new();
        assert!(locations.insert(OutputBase::parse("./a/t").stamped("1")));
        assert!(locations.insert(OutputBase::parse("s3://b/t").stamped("1")));
        assert!(!locations.insert(OutputBase::parse("./a/t").stamped("1")));
        assert_eq!(locations.local.len(), 1);
        assert_eq!(locations.remote.len(), 1);
        assert_eq!(locations.len(), 2);
    }
}
