//! Include hashes for one build.
//!
//! A partial pulled in by many pages is hashed once per build rather than
//! once per page. Every build starts from an empty table, so edits made
//! between builds are always seen.

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use super::ContentHash;
use super::hash::compute_file_hash;

/// Canonical include path → content hash, shared by the build's workers.
#[derive(Debug, Default)]
pub struct IncludeHashes {
    by_path: DashMap<PathBuf, ContentHash>,
}

impl IncludeHashes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of the file at `path`, read at most once per table.
    ///
    /// Unreadable files hash to [`ContentHash::empty`] and are not
    /// remembered, so a partial that appears mid-build is picked up.
    pub fn hash(&self, path: &Path) -> ContentHash {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(hash) = self.by_path.get(&key) {
            return *hash;
        }

        let hash = compute_file_hash(&key);
        if !hash.is_empty() {
            self.by_path.insert(key, hash);
        }
        hash
    }

    /// Whether every recorded include still has the recorded hash.
    pub fn all_match(&self, recorded: &[(PathBuf, ContentHash)]) -> bool {
        recorded.iter().all(|(path, hash)| self.hash(path) == *hash)
    }
}
