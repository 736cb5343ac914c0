//! File extension classification.
//!
//! The three extension sets are fixed tables. Nothing writes to them at
//! runtime; lookups are plain `match` arms over the lowercased extension.

use std::path::Path;

/// Extensions whose content is embedded as raw bytes.
pub const BINARY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "ico", "webp"];

/// Extensions that get token substitution and template inlining.
pub const TEXT_PROCESSABLE_EXTENSIONS: &[&str] = &["html", "htm", "css", "js"];

/// Extensions with a minifier.
pub const MINIFIABLE_EXTENSIONS: &[&str] = &["html", "htm", "css", "js"];

/// How the content of a file is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Raw bytes, emitted as a byte-slice literal.
    Binary,
    /// Text with token substitution and `{MAGIC_FILE ...}` inlining.
    Template,
    /// Text embedded as-is.
    Plain,
}

impl FileKind {
    /// Classify a lowercased extension (without the leading dot).
    pub fn from_extension(ext: &str) -> Self {
        if is_binary(ext) {
            Self::Binary
        } else if is_text_processable(ext) {
            Self::Template
        } else {
            Self::Plain
        }
    }

    pub fn is_binary(self) -> bool {
        matches!(self, Self::Binary)
    }
}

/// Lowercased extension of `path` without the dot, or `""` if it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

#[inline]
pub fn is_binary(ext: &str) -> bool {
    BINARY_EXTENSIONS.contains(&ext)
}

#[inline]
pub fn is_text_processable(ext: &str) -> bool {
    TEXT_PROCESSABLE_EXTENSIONS.contains(&ext)
}

#[inline]
pub fn is_minifiable(ext: &str) -> bool {
    MINIFIABLE_EXTENSIONS.contains(&ext)
}

/// Route ordering rank: markup first, then styles, then scripts, then the rest.
pub fn priority(ext: &str) -> u8 {
    match ext {
        "html" | "htm" => 0,
        "css" => 1,
        "js" => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extension_of_lowercases() {
        assert_eq!(extension_of(&PathBuf::from("www/Index.HTML")), "html");
        assert_eq!(extension_of(&PathBuf::from("logo.PNG")), "png");
        assert_eq!(extension_of(&PathBuf::from("Makefile")), "");
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::from_extension("png"), FileKind::Binary);
        assert_eq!(FileKind::from_extension("webp"), FileKind::Binary);
        assert_eq!(FileKind::from_extension("html"), FileKind::Template);
        assert_eq!(FileKind::from_extension("js"), FileKind::Template);
        assert_eq!(FileKind::from_extension("txt"), FileKind::Plain);
        assert_eq!(FileKind::from_extension("xml"), FileKind::Plain);
        assert_eq!(FileKind::from_extension("svg"), FileKind::Plain);
    }

    #[test]
    fn test_minifiable() {
        assert!(is_minifiable("htm"));
        assert!(is_minifiable("css"));
        assert!(!is_minifiable("png"));
        assert!(!is_minifiable("xml"));
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(priority("html"), 0);
        assert_eq!(priority("htm"), 0);
        assert_eq!(priority("css"), 1);
        assert_eq!(priority("js"), 2);
        assert_eq!(priority("png"), 3);
        assert_eq!(priority(""), 3);
    }
}
