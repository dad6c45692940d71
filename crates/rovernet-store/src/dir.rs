//! Lazy, idempotent creation of backing directories.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Ensure `path` exists as a directory, creating missing ancestors.
///
/// A directory that already exists is success. Directories are never
/// removed by this crate.
pub fn ensure_dir(path: &Path) -> StoreResult<()> {
    if path.is_dir() {
        return Ok(());
    }

    // `create_dir_all` tolerates a concurrent creator winning the race.
    fs::create_dir_all(path).map_err(|source| StoreError::DirectoryCreateFailure {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "created directory");
    Ok(())
}
