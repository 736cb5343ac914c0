//! Directory expansion for `[[dirs]]` manifest entries.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;

/// Files ignored during directory expansion.
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Collect every regular file below `dir`, sorted for determinism.
pub fn scan_dir(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}
