//! Up-to-date check based on file modification times
//!
//! A task with `sources` and `generates` is fresh when every generates
//! pattern matches at least one file and no source is newer than the
//! oldest generated file.

use crate::error::{ExecutionError, ExecutionResult};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Compare the newest source against the oldest generated file
pub fn is_up_to_date(sources: &[String], generates: &[String], base: &Path) -> ExecutionResult<bool> {
    let mut newest_source: Option<SystemTime> = None;
    for pattern in sources {
        for file in expand(pattern, base)? {
            let modified = modified(&file);
            newest_source = newest_source.max(modified);
        }
    }

    let Some(newest_source) = newest_source else {
        debug!("no source files matched");
        return Ok(false);
    };

    let mut oldest_generated: Option<SystemTime> = None;
    for pattern in generates {
        let files = expand(pattern, base)?;
        if files.is_empty() {
            debug!(pattern = %pattern, "generated file missing");
            return Ok(false);
        }
        for file in files {
            let Some(modified) = modified(&file) else {
                return Ok(false);
            };
            oldest_generated = Some(match oldest_generated {
                Some(oldest) => oldest.min(modified),
                None => modified,
            });
        }
    }

    Ok(oldest_generated.is_some_and(|oldest| oldest >= newest_source))
}

/// Files matching a pattern relative to `base`
fn expand(pattern: &str, base: &Path) -> ExecutionResult<Vec<PathBuf>> {
    let full = base.join(pattern);
    let full = full.to_string_lossy();

    let paths = glob::glob(&full).map_err(|e| ExecutionError::Glob {
        pattern: pattern.to_string(),
        error: e.to_string(),
    })?;

    Ok(paths
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect())
}

fn modified(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}
