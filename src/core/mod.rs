//! Core types - pure abstractions shared across the codebase.

mod kind;
mod state;

pub use kind::{FileKind, extension_of, is_minifiable, is_text_processable, priority};
pub use state::{is_shutdown, setup_shutdown_handler};

/// Namespace used when `root-namespace` is not configured.
pub const DEFAULT_NAMESPACE: &str = "embedkit";

/// Visibility used when `visibility` is not configured.
pub const DEFAULT_VISIBILITY: &str = "pub(crate)";
