//! Change-aware file output.

use std::fs;
use std::path::Path;

use crate::debug;
use crate::freshness::ContentHash;

use super::EmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Write `content` to `path` unless the file already holds the same bytes.
///
/// Unchanged files keep their mtime, so cargo does not rebuild dependents.
pub fn write_if_changed(path: &Path, content: &str) -> Result<WriteOutcome, EmitError> {
    let unchanged =
        fs::read(path).is_ok_and(|existing| ContentHash::of(existing) == ContentHash::of(content));
    if unchanged {
        debug!("emit"; "{} unchanged, skipping write", path.display());
        return Ok(WriteOutcome::Unchanged);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| EmitError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(WriteOutcome::Written)
}

/// Delete `path` if it exists. Returns whether a file was removed.
pub fn remove_stale(path: &Path) -> Result<bool, EmitError> {
    if !path.is_file() {
        return Ok(false);
    }
    fs::remove_file(path).map_err(|source| EmitError::Remove {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}
