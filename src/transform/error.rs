//! Errors raised while turning one input file into an artifact.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to process a single input file. Never aborts the build.
#[derive(Debug, Error)]
pub enum FileProcessingError {
    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read included template `{}`", path.display())]
    Include {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
