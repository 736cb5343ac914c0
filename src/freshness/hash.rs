//! Content hashing using blake3.
//!
//! Cache keys carry content hashes rather than timestamps, so a file that is
//! rewritten with identical bytes does not invalidate anything.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash representing "no content" (all zeros), used for unreadable files.
    #[inline]
    pub const fn empty() -> Self {
        Self([0; 32])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == [0; 32]
    }

    /// Hash an in-memory buffer.
    pub fn of(data: impl AsRef<[u8]>) -> Self {
        Self(*blake3::hash(data.as_ref()).as_bytes())
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 16 hex chars are plenty for logs
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Stream the file at `path` through blake3.
///
/// Returns [`ContentHash::empty`] when the file cannot be read.
pub fn compute_file_hash(path: &Path) -> ContentHash {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return ContentHash::empty(),
    };

    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return ContentHash::empty(),
        }
    }

    ContentHash::new(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_content_hash_display() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(format!("{}", hash), "abababababababab");
    }

    #[test]
    fn test_of_matches_file_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        fs::write(&path, "hello world").unwrap();

        assert_eq!(compute_file_hash(&path), ContentHash::of("hello world"));
        assert_ne!(ContentHash::of("hello world"), ContentHash::of("goodbye world"));
    }

    #[test]
    fn test_compute_file_hash_follows_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        fs::write(&path, "hello world").unwrap();

        let hash1 = compute_file_hash(&path);
        assert_eq!(hash1, compute_file_hash(&path));
        assert!(!hash1.is_empty());

        fs::write(&path, "goodbye world").unwrap();
        assert_ne!(hash1, compute_file_hash(&path));
    }

    #[test]
    fn test_compute_file_hash_nonexistent() {
        let hash = compute_file_hash(Path::new("/nonexistent/file.txt"));
        assert!(hash.is_empty());
    }
}
