//! Turns one input file into an embeddable artifact.
//!
//! # Pipeline
//!
//! ```text
//! binary ext ──► read bytes ──► &[..] literal
//! text ext   ──► read text ──► tokens + includes (html/htm/css/js only)
//!                          ──► minify (if enabled) ──► "..." literal
//! ```

mod error;
mod inline;
mod literal;
mod minify;
mod token;

use std::io;
use std::path::{Path, PathBuf};
use std::str;

pub use error::FileProcessingError;
pub use literal::text_literal;
pub use token::unix_now;

use crate::config::{FileOptions, GlobalOptions};
use crate::core::{FileKind, extension_of, is_minifiable, is_text_processable};
use crate::input::InputFile;
use crate::utils::path::relative_path;
use inline::{Inlined, inline};
use literal::bytes_literal;
use minify::minify;
use token::substitute;

/// Derived, cacheable result of processing one file.
///
/// Plain value type: two artifacts with equal fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileArtifact {
    pub class_name: String,
    /// Slash-separated path below the project dir, or the bare file name.
    pub relative_path: String,
    /// Lowercase, without the dot.
    pub extension: String,
    /// Ready-to-embed literal (`"..."` or `&[..]`).
    pub content: String,
    pub remove_route_extension: bool,
    pub cache_control: Option<String>,
    /// Always false for extensions that cannot be minified.
    pub should_minify: bool,
}

impl FileArtifact {
    #[inline]
    pub fn kind(&self) -> FileKind {
        FileKind::from_extension(&self.extension)
    }
}

/// An artifact plus the template files its output depends on.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub artifact: FileArtifact,
    /// Inlined templates and directive targets that did not exist.
    pub includes: Vec<PathBuf>,
}

/// Read the raw content of an input file.
///
/// The graph hashes these bytes for its cache key and hands the same buffer
/// to [`transform`], so the key always describes the transformed content.
pub fn read_source(file: &dyn InputFile) -> Result<Vec<u8>, FileProcessingError> {
    file.read_bytes().map_err(|source| FileProcessingError::Read {
        path: file.path().to_path_buf(),
        source,
    })
}

/// Process one file from its already-read content.
///
/// `now` is the build timestamp used for token substitution.
pub fn transform(
    options: &FileOptions,
    global: &GlobalOptions,
    bytes: &[u8],
    now: u64,
) -> Result<Transformed, FileProcessingError> {
    let path = options.file.path();
    let extension = extension_of(path);
    let minifiable = is_minifiable(&extension);
    let should_minify = options.minify.resolve(global.minify) && minifiable;
    let minify_content = options.minify.minifies_content(global.minify) && minifiable;

    let (content, includes) = if FileKind::from_extension(&extension).is_binary() {
        (bytes_literal(bytes), Vec::new())
    } else {
        let text = str::from_utf8(bytes).map_err(|e| FileProcessingError::Read {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        let (text, includes) = if is_text_processable(&extension) {
            expand(text, path, now)?
        } else {
            (text.to_string(), Vec::new())
        };
        let text = if minify_content {
            minify(&extension, &text).unwrap_or(text)
        } else {
            text
        };
        (text_literal(&text), includes)
    };

    let artifact = FileArtifact {
        class_name: options.class.clone().unwrap_or_default(),
        relative_path: relative_path(path, global.project_dir.as_deref()),
        extension,
        content,
        remove_route_extension: options.remove_route_extension,
        cache_control: options.cache_control.clone(),
        should_minify,
    };
    Ok(Transformed { artifact, includes })
}

/// Token substitution followed by include resolution.
fn expand(
    text: &str,
    path: &Path,
    now: u64,
) -> Result<(String, Vec<PathBuf>), FileProcessingError> {
    let substituted = substitute(text, now);
    let base_dir = path.parent().unwrap_or(Path::new("."));
    let Inlined {
        content,
        mut includes,
        missing,
    } = inline(&substituted, base_dir)?;
    includes.extend(missing);
    Ok((content, includes))
}
