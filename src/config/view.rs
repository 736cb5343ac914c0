//! Key/value configuration view supplied by the host.
//!
//! Two scopes: global build properties and per-file metadata keyed by the
//! file path. Empty values are reported as absent, so every consumer can
//! treat `None` as "not configured".

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

/// Recognized configuration keys.
pub mod keys {
    // Global scope
    pub const ROOT_NAMESPACE: &str = "root-namespace";
    pub const VISIBILITY: &str = "visibility";
    pub const ROUTES: &str = "routes";
    pub const ROUTES_CACHE_CONTROL: &str = "routes-cache-control";
    pub const MINIFY: &str = "minify";
    pub const PROJECT_DIR: &str = "project-dir";

    // File scope
    pub const CLASS: &str = "class";
    pub const REMOVE_ROUTE_EXTENSION: &str = "remove-route-extension";
    pub const CACHE_CONTROL: &str = "cache-control";
    pub const FILE_MINIFY: &str = "minify";
}

/// Read-only view over build configuration.
pub trait ConfigView {
    /// Look up a global build property.
    fn global(&self, key: &str) -> Option<&str>;

    /// Look up a metadata value attached to one input file.
    fn file(&self, path: &Path, key: &str) -> Option<&str>;
}

/// In-memory configuration, filled by the manifest loader or by tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    global: FxHashMap<String, String>,
    files: FxHashMap<PathBuf, FxHashMap<String, String>>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_global(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.global.insert(key.into(), value.into());
    }

    pub fn set_file(
        &mut self,
        path: impl Into<PathBuf>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.files
            .entry(path.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Builder form of [`set_global`](Self::set_global).
    #[cfg(test)]
    pub fn with_global(mut self, key: &str, value: &str) -> Self {
        self.set_global(key, value);
        self
    }

    /// Builder form of [`set_file`](Self::set_file).
    #[cfg(test)]
    pub fn with_file(mut self, path: impl Into<PathBuf>, key: &str, value: &str) -> Self {
        self.set_file(path, key, value);
        self
    }

    /// Paths that carry any per-file metadata.
    #[cfg(test)]
    pub fn file_paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }
}

impl ConfigView for RawConfig {
    fn global(&self, key: &str) -> Option<&str> {
        non_empty(self.global.get(key))
    }

    fn file(&self, path: &Path, key: &str) -> Option<&str> {
        non_empty(self.files.get(path).and_then(|m| m.get(key)))
    }
}

#[inline]
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_absent() {
        let config = RawConfig::new()
            .with_global(keys::VISIBILITY, "")
            .with_file("a.html", keys::CLASS, "");
        assert_eq!(config.global(keys::VISIBILITY), None);
        assert_eq!(config.file(Path::new("a.html"), keys::CLASS), None);
    }

    #[test]
    fn test_file_scope_is_keyed_by_path() {
        let config = RawConfig::new()
            .with_file("a.html", keys::CLASS, "pages")
            .with_file("b.css", keys::CLASS, "styles");
        assert_eq!(config.file(Path::new("a.html"), keys::CLASS), Some("pages"));
        assert_eq!(config.file(Path::new("b.css"), keys::CLASS), Some("styles"));
        assert_eq!(config.file(Path::new("c.js"), keys::CLASS), None);
        assert_eq!(config.file_paths().count(), 2);
    }
}
