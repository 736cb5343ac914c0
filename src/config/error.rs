//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Manifest loading errors.
///
/// Only the CLI host produces these; the pipeline itself never fails on
/// configuration and falls back to defaults instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Manifest parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Manifest validation error: {0}")]
    Validation(String),
}
