//! Recursive `{MAGIC_FILE <path>}` inlining.
//!
//! Each directive is replaced by the content of the referenced file, which is
//! itself inlined relative to its own directory. Directives pointing at files
//! that do not exist stay in the output untouched.
//!
//! Nesting is capped at [`MAX_INCLUDE_DEPTH`] levels. A directive beyond the
//! cap is left verbatim, which also terminates include cycles.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::FileProcessingError;
use crate::debug;

/// Maximum number of nested includes below a top-level file.
pub const MAX_INCLUDE_DEPTH: usize = 32;

/// `{MAGIC_FILE path}`. The path may contain one level of `{...}` groups and
/// is trimmed of surrounding whitespace.
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{MAGIC_FILE(?-u:\s)+(?<file>(?:[^{}\r\n]|\{[^{}\r\n]*\})+?)(?-u:\s)*\}")
        .unwrap()
});

/// Inlined content plus every template file that was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inlined {
    pub content: String,
    /// Included files in resolution order (may repeat).
    pub includes: Vec<PathBuf>,
    /// Directive targets that did not exist. Creating one changes the output.
    pub missing: Vec<PathBuf>,
}

/// Resolve all directives in `content`, relative to `base_dir`.
pub fn inline(content: &str, base_dir: &Path) -> Result<Inlined, FileProcessingError> {
    let mut inlined = Inlined::default();
    let content = inline_at(content, base_dir, 0, &mut inlined)?;
    inlined.content = content;
    Ok(inlined)
}

fn inline_at(
    content: &str,
    base_dir: &Path,
    depth: usize,
    trace: &mut Inlined,
) -> Result<String, FileProcessingError> {
    if !content.contains("{MAGIC_FILE") {
        return Ok(content.to_string());
    }

    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for caps in DIRECTIVE.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        let name = caps.name("file").map_or("", |m| m.as_str());

        out.push_str(&content[last..whole.start()]);
        last = whole.end();

        let target = resolve_target(base_dir, name);
        if !target.is_file() {
            trace.missing.push(target);
            out.push_str(whole.as_str());
            continue;
        }
        if depth >= MAX_INCLUDE_DEPTH {
            debug!("inline"; "include depth {} exceeded at {}", MAX_INCLUDE_DEPTH, target.display());
            out.push_str(whole.as_str());
            continue;
        }

        let text = fs::read_to_string(&target).map_err(|source| FileProcessingError::Include {
            path: target.clone(),
            source,
        })?;
        let nested_base = target.parent().unwrap_or(base_dir).to_path_buf();
        trace.includes.push(target);
        out.push_str(&inline_at(&text, &nested_base, depth + 1, trace)?);
    }

    out.push_str(&content[last..]);
    Ok(out)
}

/// Absolute paths are used as-is, relative ones are joined to `base_dir`.
fn resolve_target(base_dir: &Path, name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_directive_is_identity() {
        let dir = TempDir::new().unwrap();
        let result = inline("<p>hello</p>", dir.path()).unwrap();
        assert_eq!(result.content, "<p>hello</p>");
        assert!(result.includes.is_empty());
    }

    #[test]
    fn test_missing_target_left_verbatim() {
        let dir = TempDir::new().unwrap();
        let source = "<body>{MAGIC_FILE missing.html}</body>";
        let result = inline(source, dir.path()).unwrap();
        assert_eq!(result.content, source);
        assert_eq!(result.missing, vec![dir.path().join("missing.html")]);
    }

    #[test]
    fn test_relative_include() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("header.html"), "<header>hi</header>").unwrap();

        let result = inline("<body>{MAGIC_FILE header.html }</body>", dir.path()).unwrap();
        assert_eq!(result.content, "<body><header>hi</header></body>");
        assert_eq!(result.includes, vec![dir.path().join("header.html")]);
    }

    #[test]
    fn test_absolute_include() {
        let dir = TempDir::new().unwrap();
        let partial = dir.path().join("partial.css");
        fs::write(&partial, "a{}").unwrap();

        let other = TempDir::new().unwrap();
        let source = format!("/* {{MAGIC_FILE {}}} */", partial.display());
        let result = inline(&source, other.path()).unwrap();
        assert_eq!(result.content, "/* a{} */");
    }

    #[test]
    fn test_nested_include_resolves_relative_to_including_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("parts/inner")).unwrap();
        fs::write(
            dir.path().join("parts/outer.html"),
            "[outer {MAGIC_FILE inner/leaf.html}]",
        )
        .unwrap();
        fs::write(dir.path().join("parts/inner/leaf.html"), "leaf").unwrap();

        let result = inline("{MAGIC_FILE parts/outer.html}", dir.path()).unwrap();
        assert_eq!(result.content, "[outer leaf]");
        assert_eq!(result.includes.len(), 2);
    }

    #[test]
    fn test_multiple_directives_multiline() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.html"), "A").unwrap();
        fs::write(dir.path().join("b.html"), "B").unwrap();

        let source = "line1\n{MAGIC_FILE a.html}{MAGIC_FILE b.html}\nline3 {MAGIC_FILE a.html}\n";
        let result = inline(source, dir.path()).unwrap();
        assert_eq!(result.content, "line1\nAB\nline3 A\n");
    }

    #[test]
    fn test_braces_inside_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("{lang}.html"), "EN").unwrap();

        let result = inline("<p>{MAGIC_FILE {lang}.html}</p>", dir.path()).unwrap();
        assert_eq!(result.content, "<p>EN</p>");
    }

    #[test]
    fn test_cycle_stops_at_depth_limit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.html"), "a{MAGIC_FILE b.html}").unwrap();
        fs::write(dir.path().join("b.html"), "b{MAGIC_FILE a.html}").unwrap();

        let result = inline("{MAGIC_FILE a.html}", dir.path()).unwrap();
        assert_eq!(result.includes.len(), MAX_INCLUDE_DEPTH);
        assert!(result.content.starts_with("abab"));
        assert!(result.content.ends_with(".html}"));
        assert_eq!(result.content.matches("{MAGIC_FILE").count(), 1);
    }
}
