//! Global manifest with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic replacement, so watch mode
//! can pick up edits to `embedkit.toml` between rebuilds.

use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

use super::error::ConfigError;
use super::manifest::Manifest;
use crate::utils::hash;

/// Global manifest storage.
static MANIFEST: LazyLock<ArcSwap<Manifest>> =
    LazyLock::new(|| ArcSwap::from_pointee(Manifest::default()));

/// Hash of the manifest text currently loaded.
static MANIFEST_HASH: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn manifest() -> Arc<Manifest> {
    MANIFEST.load_full()
}

/// Install the initial manifest.
pub fn init_manifest(manifest: Manifest) -> Arc<Manifest> {
    if let Ok(content) = fs::read_to_string(&manifest.manifest_path) {
        MANIFEST_HASH.store(hash::compute(content.as_bytes()), Ordering::Relaxed);
    }
    let arc = Arc::new(manifest);
    MANIFEST.store(Arc::clone(&arc));
    arc
}

/// Reload the manifest from disk if its text changed.
///
/// Returns `Ok(true)` if the manifest was replaced, `Ok(false)` if unchanged.
pub fn reload_manifest() -> Result<bool, ConfigError> {
    let current = manifest();
    let path = &current.manifest_path;

    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.clone(), e))?;
    let new_hash = hash::compute(content.as_bytes());
    if new_hash == MANIFEST_HASH.load(Ordering::Relaxed) {
        return Ok(false);
    }

    let reloaded = Manifest::load(path)?;
    MANIFEST.store(Arc::new(reloaded));
    MANIFEST_HASH.store(new_hash, Ordering::Relaxed);
    Ok(true)
}
