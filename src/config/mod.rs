//! Build configuration.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── view       # ConfigView trait + RawConfig (host key/value scopes)
//! ├── options    # GlobalOptions / FileOptions resolution
//! ├── manifest   # embedkit.toml → RawConfig + input list
//! ├── handle     # Global manifest handle (arc-swap)
//! └── error      # ConfigError
//! ```
//!
//! The pipeline only ever sees a [`ConfigView`]; the manifest is one way
//! for a host to build one.

mod error;
mod handle;
mod manifest;
mod options;
mod view;

pub use handle::{init_manifest, manifest, reload_manifest};
pub use manifest::{MANIFEST_NAME, Manifest, ResolvedManifest, find_manifest};
pub use options::{FileOptions, GlobalOptions, resolve_file, resolve_global};
#[cfg(test)]
pub use options::MinifyOverride;
pub use view::{ConfigView, RawConfig, keys};
