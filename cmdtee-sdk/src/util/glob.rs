//! Glob expansion for command arguments.

use std::path::PathBuf;

use tracing::debug;

use crate::types::Result;

/// Expand each pattern and concatenate the matches in input order.
///
/// A pattern that matches nothing contributes nothing. A malformed pattern
/// fails the whole call.
pub fn expand_globs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        for entry in ::glob::glob(pattern)? {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => debug!(pattern, error = %e, "Skipping unreadable glob entry"),
            }
        }
    }

    Ok(paths)
}
