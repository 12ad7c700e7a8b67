//! Local trial directory removal

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use contracts::LocalLocation;
use tracing::{debug, info};

use crate::error::{CleanupError, Result};

/// Remove the top-level directory of every location that still exists
///
/// Locations share top-level directories, so most of them are already gone
/// by the time they are visited; those are skipped. Returns the number of
/// directories removed.
pub fn remove_local(work_dir: &Path, locations: &BTreeSet<LocalLocation>) -> Result<usize> {
    let mut removed = 0;

    for location in locations {
        if !work_dir.join(&location.path).exists() {
            debug!(path = %location.path.display(), "local location absent, skipped");
            continue;
        }

        let top_level = work_dir.join(&location.top_level);
        match std::fs::remove_dir_all(&top_level) {
            Ok(()) => {
                info!(path = %top_level.display(), "removed local trial directory");
                removed += 1;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %top_level.display(), "local directory vanished before removal");
            }
            Err(source) => {
                return Err(CleanupError::Local {
                    path: top_level,
                    source,
                })
            }
        }
    }

    Ok(removed)
}
