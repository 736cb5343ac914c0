//! Path helpers. Pure functions, no filesystem access.

use std::path::Path;

/// Replace every backslash with a forward slash.
#[inline]
pub fn to_slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Path of `file` relative to `root`, slash-separated.
///
/// Falls back to the bare file name when no root is known or the file does
/// not live below it.
pub fn relative_path(file: &Path, root: Option<&Path>) -> String {
    if let Some(root) = root
        && let Ok(rel) = file.strip_prefix(root)
        && !rel.as_os_str().is_empty()
    {
        return to_slash(&rel.to_string_lossy());
    }

    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| to_slash(&file.to_string_lossy()))
}

/// Count of `/` separators in a slash-normalized path.
#[inline]
pub fn depth(path: &str) -> usize {
    path.matches('/').count()
}
