//! Option records resolved from the configuration view.
//!
//! Resolution never fails: missing or malformed values fall back to their
//! defaults and are not reported.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use crate::core::{DEFAULT_NAMESPACE, DEFAULT_VISIBILITY};
use crate::input::SharedFile;

use super::view::{ConfigView, keys};

/// Process-wide options, one per build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalOptions {
    /// Root module the generated code lives in.
    pub namespace: String,
    /// Visibility token for generated items (`pub`, `pub(crate)`, ...).
    pub visibility: String,
    /// Generate route handlers and the route table.
    pub routes: bool,
    /// Cache-Control used by routes without a per-file override.
    pub cache_control: Option<String>,
    /// Minify every minifiable file unless a file opts out.
    pub minify: bool,
    /// Root for relative paths. Unknown root means bare file names.
    pub project_dir: Option<PathBuf>,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            visibility: DEFAULT_VISIBILITY.to_string(),
            routes: false,
            cache_control: None,
            minify: false,
            project_dir: None,
        }
    }
}

/// Per-file minification override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MinifyOverride {
    /// No per-file value: follow the global flag.
    #[default]
    Inherit,
    ForceOn,
    ForceOff,
}

impl MinifyOverride {
    /// Merge with the global flag. This is the value recorded on the artifact.
    pub fn resolve(self, global: bool) -> bool {
        match self {
            Self::Inherit => global,
            Self::ForceOn => true,
            Self::ForceOff => false,
        }
    }

    /// Whether the content itself goes through the minifier.
    ///
    /// A per-file value can only switch minification on; a global `true`
    /// applies to every file.
    pub fn minifies_content(self, global: bool) -> bool {
        self == Self::ForceOn || global
    }
}

/// Options attached to one input file.
///
/// Equality and hashing use the settings plus the file *path*; the handle
/// itself is not compared, its content is keyed separately by hash.
#[derive(Clone)]
pub struct FileOptions {
    /// Module path the constant is emitted under. `None` excludes the file.
    pub class: Option<String>,
    pub remove_route_extension: bool,
    pub cache_control: Option<String>,
    pub minify: MinifyOverride,
    pub file: SharedFile,
}

impl FileOptions {
    /// Options with every setting at its default.
    pub fn new(file: SharedFile) -> Self {
        Self {
            class: None,
            remove_route_extension: false,
            cache_control: None,
            minify: MinifyOverride::Inherit,
            file,
        }
    }

    /// Whether the file participates in the pipeline at all.
    #[inline]
    pub fn is_included(&self) -> bool {
        self.class.is_some()
    }
}

impl PartialEq for FileOptions {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.remove_route_extension == other.remove_route_extension
            && self.cache_control == other.cache_control
            && self.minify == other.minify
            && self.file.path() == other.file.path()
    }
}

impl Eq for FileOptions {}

impl Hash for FileOptions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        self.remove_route_extension.hash(state);
        self.cache_control.hash(state);
        self.minify.hash(state);
        self.file.path().hash(state);
    }
}

impl fmt::Debug for FileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileOptions")
            .field("class", &self.class)
            .field("remove_route_extension", &self.remove_route_extension)
            .field("cache_control", &self.cache_control)
            .field("minify", &self.minify)
            .field("path", &self.file.path())
            .finish()
    }
}

/// Resolve global options from build properties.
pub fn resolve_global(view: &impl ConfigView) -> GlobalOptions {
    GlobalOptions {
        namespace: view
            .global(keys::ROOT_NAMESPACE)
            .unwrap_or(DEFAULT_NAMESPACE)
            .to_string(),
        visibility: view
            .global(keys::VISIBILITY)
            .unwrap_or(DEFAULT_VISIBILITY)
            .to_string(),
        routes: parse_flag(view.global(keys::ROUTES)),
        cache_control: view.global(keys::ROUTES_CACHE_CONTROL).map(str::to_string),
        minify: parse_flag(view.global(keys::MINIFY)),
        project_dir: view.global(keys::PROJECT_DIR).map(PathBuf::from),
    }
}

/// Resolve options for one input file from its metadata.
pub fn resolve_file(view: &impl ConfigView, file: SharedFile) -> FileOptions {
    let path = file.path().to_path_buf();
    let minify = match view.file(&path, keys::FILE_MINIFY) {
        None => MinifyOverride::Inherit,
        Some(v) if parse_bool(v) == Some(true) => MinifyOverride::ForceOn,
        Some(_) => MinifyOverride::ForceOff,
    };

    FileOptions {
        class: view.file(&path, keys::CLASS).map(str::to_string),
        remove_route_extension: parse_flag(view.file(&path, keys::REMOVE_ROUTE_EXTENSION)),
        cache_control: view.file(&path, keys::CACHE_CONTROL).map(str::to_string),
        minify,
        file,
    }
}

/// Parse `true`/`false`, case-insensitive, surrounding whitespace ignored.
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Lenient flag: absent or unparsable means `false`.
#[inline]
fn parse_flag(value: Option<&str>) -> bool {
    value.and_then(parse_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use crate::input::DiskFile;

    #[test]
    fn test_global_defaults() {
        let global = resolve_global(&RawConfig::new());
        assert_eq!(global, GlobalOptions::default());
        assert_eq!(global.namespace, "embedkit");
        assert_eq!(global.visibility, "pub(crate)");
        assert!(!global.routes);
        assert!(!global.minify);
    }

    #[test]
    fn test_global_values() {
        let config = RawConfig::new()
            .with_global(keys::ROOT_NAMESPACE, "assets")
            .with_global(keys::VISIBILITY, "pub")
            .with_global(keys::ROUTES, "True")
            .with_global(keys::ROUTES_CACHE_CONTROL, "max-age=60")
            .with_global(keys::MINIFY, " true ")
            .with_global(keys::PROJECT_DIR, "/srv/site");
        let global = resolve_global(&config);
        assert_eq!(global.namespace, "assets");
        assert_eq!(global.visibility, "pub");
        assert!(global.routes);
        assert_eq!(global.cache_control.as_deref(), Some("max-age=60"));
        assert!(global.minify);
        assert_eq!(global.project_dir, Some(PathBuf::from("/srv/site")));
    }

    #[test]
    fn test_malformed_flags_are_false() {
        let config = RawConfig::new()
            .with_global(keys::ROUTES, "yes")
            .with_global(keys::MINIFY, "1");
        let global = resolve_global(&config);
        assert!(!global.routes);
        assert!(!global.minify);
    }

    #[test]
    fn test_file_without_class_is_excluded() {
        let file = DiskFile::shared("/site/a.html");
        let options = resolve_file(&RawConfig::new(), file);
        assert!(!options.is_included());
        assert_eq!(options.minify, MinifyOverride::Inherit);
    }

    #[test]
    fn test_file_minify_tri_state() {
        let config = RawConfig::new()
            .with_file("/site/on.html", keys::FILE_MINIFY, "TRUE")
            .with_file("/site/off.html", keys::FILE_MINIFY, "false")
            .with_file("/site/junk.html", keys::FILE_MINIFY, "maybe");

        let on = resolve_file(&config, DiskFile::shared("/site/on.html"));
        let off = resolve_file(&config, DiskFile::shared("/site/off.html"));
        let junk = resolve_file(&config, DiskFile::shared("/site/junk.html"));
        let unset = resolve_file(&config, DiskFile::shared("/site/unset.html"));

        assert_eq!(on.minify, MinifyOverride::ForceOn);
        assert_eq!(off.minify, MinifyOverride::ForceOff);
        assert_eq!(junk.minify, MinifyOverride::ForceOff);
        assert_eq!(unset.minify, MinifyOverride::Inherit);
    }

    #[test]
    fn test_minify_override_resolution() {
        assert!(MinifyOverride::Inherit.resolve(true));
        assert!(!MinifyOverride::Inherit.resolve(false));
        assert!(MinifyOverride::ForceOn.resolve(false));
        assert!(!MinifyOverride::ForceOff.resolve(true));
    }

    #[test]
    fn test_minify_override_content_rule() {
        assert!(MinifyOverride::ForceOff.minifies_content(true));
        assert!(!MinifyOverride::ForceOff.minifies_content(false));
        assert!(MinifyOverride::ForceOn.minifies_content(false));
        assert!(MinifyOverride::Inherit.minifies_content(true));
        assert!(!MinifyOverride::Inherit.minifies_content(false));
    }

    #[test]
    fn test_file_options_equality_ignores_handle_identity() {
        let config = RawConfig::new().with_file("/site/a.html", keys::CLASS, "pages");
        let a = resolve_file(&config, DiskFile::shared("/site/a.html"));
        let b = resolve_file(&config, DiskFile::shared("/site/a.html"));
        assert_eq!(a, b);

        let mut c = b.clone();
        c.remove_route_extension = true;
        assert_ne!(a, c);
    }
}
