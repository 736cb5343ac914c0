//! Input file handles supplied by the host.
//!
//! The pipeline never opens input files by path on its own: every read of
//! an input goes through [`InputFile`], so hosts can serve content from disk,
//! memory, or a virtual filesystem. Included templates are the exception and
//! are always read from disk (see `transform::inline`).

mod scan;

pub use scan::scan_dir;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single input file.
pub trait InputFile: Send + Sync {
    /// Path as known to the host (usually absolute).
    fn path(&self) -> &Path;

    /// Raw content. Text decoding happens in the transformer.
    fn read_bytes(&self) -> io::Result<Vec<u8>>;
}

/// Shared handle to an input file.
pub type SharedFile = Arc<dyn InputFile>;

impl fmt::Debug for dyn InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InputFile").field(&self.path()).finish()
    }
}

/// Input file backed by the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiskFile {
    path: PathBuf,
}

impl DiskFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn shared(path: impl Into<PathBuf>) -> SharedFile {
        Arc::new(Self::new(path))
    }
}

impl InputFile for DiskFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}
