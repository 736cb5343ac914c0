//! `embedkit.toml` manifest.
//!
//! # Example
//!
//! ```toml
//! [build]
//! root-namespace = "assets"   # root module of generated code
//! visibility = "pub"
//! routes = true               # generate route handlers + routes()
//! routes-cache-control = "public, max-age=3600"
//! minify = true
//! project-dir = "."           # relative to this file (default: its directory)
//! output = "src/generated"    # where generated sources are written
//!
//! [[dirs]]                    # every file below `dir` gets this metadata
//! dir = "www/static"
//! class = "static"
//!
//! [[files]]                   # single file; wins over a matching [[dirs]] entry
//! path = "www/index.html"
//! class = "pages"
//! remove-route-extension = true
//! minify = false
//! ```
//!
//! Scalar values are flattened to strings before they reach the resolver,
//! which applies its own lenient parsing.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::Deserialize;

use super::error::ConfigError;
use super::view::{RawConfig, keys};
use crate::debug;
use crate::input::scan_dir;

/// Default manifest file name.
pub const MANIFEST_NAME: &str = "embedkit.toml";

type Properties = BTreeMap<String, toml::Value>;

/// Parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Absolute path to the manifest file (internal use only)
    #[serde(skip)]
    pub manifest_path: PathBuf,

    /// Directory containing the manifest (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub build: BuildSection,
    pub files: Vec<FileEntry>,
    pub dirs: Vec<DirEntry>,
}

/// `[build]`: output directory plus the global build properties.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Generated sources directory (relative to the manifest).
    pub output: PathBuf,

    #[serde(flatten)]
    pub properties: Properties,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output: "generated".into(),
            properties: Properties::new(),
        }
    }
}

/// `[[files]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub metadata: Properties,
}

/// `[[dirs]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DirEntry {
    pub dir: PathBuf,
    #[serde(flatten)]
    pub metadata: Properties,
}

/// Everything the pipeline needs from a manifest.
#[derive(Debug, Clone, Default)]
pub struct ResolvedManifest {
    pub config: RawConfig,
    /// Input files in manifest order, deduplicated.
    pub inputs: Vec<PathBuf>,
}

impl Manifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut manifest = Self::parse(&content)?;
        manifest.manifest_path = path.to_path_buf();
        manifest.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(manifest)
    }

    /// Parse manifest text without touching the filesystem.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let manifest: Self = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(idx) = self.files.iter().position(|f| f.path.as_os_str().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "[files.{idx}] path must not be empty"
            )));
        }
        if let Some(idx) = self.dirs.iter().position(|d| d.dir.as_os_str().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "[dirs.{idx}] dir must not be empty"
            )));
        }
        Ok(())
    }

    /// Join a manifest-relative path with the manifest directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute generated-sources directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.build.output)
    }

    /// Directories that should be watched for changes.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<_> = self.dirs.iter().map(|d| self.root_join(&d.dir)).collect();
        for file in &self.files {
            if let Some(parent) = self.root_join(&file.path).parent() {
                roots.push(parent.to_path_buf());
            }
        }
        roots.sort();
        roots.dedup();
        roots
    }

    /// Flatten into a configuration view plus the ordered input list.
    pub fn resolve(&self) -> ResolvedManifest {
        let mut config = RawConfig::new();
        let mut inputs = Vec::new();
        let mut seen = FxHashSet::default();

        for (key, value) in &self.build.properties {
            if let Some(value) = scalar_to_string(key, value) {
                config.set_global(key.as_str(), value);
            }
        }

        let project_dir = match config_project_dir(&self.build.properties) {
            Some(dir) => self.root_join(dir),
            None => self.root.clone(),
        };
        config.set_global(keys::PROJECT_DIR, project_dir.to_string_lossy().into_owned());

        for entry in &self.dirs {
            for path in scan_dir(&self.root_join(&entry.dir)) {
                apply_metadata(&mut config, &path, &entry.metadata);
                if seen.insert(path.clone()) {
                    inputs.push(path);
                }
            }
        }

        for entry in &self.files {
            let path = self.root_join(&entry.path);
            apply_metadata(&mut config, &path, &entry.metadata);
            if seen.insert(path.clone()) {
                inputs.push(path);
            }
        }

        ResolvedManifest { config, inputs }
    }
}

fn config_project_dir(properties: &Properties) -> Option<&str> {
    properties
        .get(keys::PROJECT_DIR)
        .and_then(toml::Value::as_str)
        .filter(|s| !s.is_empty())
}

fn apply_metadata(config: &mut RawConfig, path: &Path, metadata: &Properties) {
    for (key, value) in metadata {
        if let Some(value) = scalar_to_string(key, value) {
            config.set_file(path, key.as_str(), value);
        }
    }
}

/// Flatten a TOML scalar to its textual form. Arrays and tables are skipped.
fn scalar_to_string(key: &str, value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        other => {
            debug!("config"; "ignoring non-scalar value for `{}`: {}", key, other.type_str());
            None
        }
    }
}

/// Find the manifest by searching upward from the current directory.
pub fn find_manifest(name: &Path) -> Option<PathBuf> {
    if name.is_absolute() {
        return name.exists().then(|| name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(name);
        if candidate.exists() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}
