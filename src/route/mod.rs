//! Route derivation for served artifacts.
//!
//! Each routable [`FileArtifact`] yields one [`RouteDescriptor`]; all of them
//! together form the [`RouteTable`].

mod error;
pub mod mime;
mod table;

pub use error::RouteError;
pub use table::RouteTable;

use crate::core::priority;
use crate::transform::FileArtifact;
use crate::utils::path::{depth, to_slash};

/// Everything needed to emit one handler and register it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteDescriptor {
    /// Path below `/`. Empty for the site root.
    pub route_name: String,
    /// Generated handler function name.
    pub handler: String,
    pub mime: &'static str,
    /// Empty when no cache-control header is sent.
    pub cache_control: String,
    pub priority: u8,
    /// Separator count of the source path.
    pub depth: usize,
    /// Relative path of the source file, for diagnostics.
    pub relative_path: String,
}

/// Derive the route of one artifact.
///
/// `default_cache_control` applies when the file has no value of its own.
pub fn derive(
    artifact: &FileArtifact,
    default_cache_control: Option<&str>,
) -> Result<RouteDescriptor, RouteError> {
    let route = route_name(
        &artifact.relative_path,
        &artifact.extension,
        artifact.remove_route_extension,
    );
    validate(&route, &artifact.relative_path)?;

    Ok(RouteDescriptor {
        depth: depth(&to_slash(&artifact.relative_path)),
        handler: handler_ident(&artifact.relative_path),
        mime: mime::from_extension(&artifact.extension),
        cache_control: artifact
            .cache_control
            .as_deref()
            .or(default_cache_control)
            .unwrap_or_default()
            .to_string(),
        priority: priority(&artifact.extension),
        relative_path: artifact.relative_path.clone(),
        route_name: route,
    })
}

/// Normalize a relative path into a route name.
///
/// ```text
/// index.html             → ""
/// blog/index.htm         → "blog"
/// about.html  (remove)   → "about"
/// about.html             → "about.html"
/// ```
pub fn route_name(relative_path: &str, ext: &str, remove_extension: bool) -> String {
    let path = to_slash(relative_path);

    if path == "index.html" || path == "index.htm" {
        return String::new();
    }
    for suffix in ["/index.html", "/index.htm"] {
        if let Some(dir) = path.strip_suffix(suffix) {
            return dir.to_string();
        }
    }
    if remove_extension && let Some(stem) = strip_extension(&path, ext) {
        return stem.to_string();
    }
    path
}

/// `path` without a trailing `.ext`, compared case-insensitively.
fn strip_extension<'a>(path: &'a str, ext: &str) -> Option<&'a str> {
    if ext.is_empty() {
        return None;
    }
    let cut = path.len().checked_sub(ext.len() + 1)?;
    if cut == 0 || !path.is_char_boundary(cut) {
        return None;
    }
    let (stem, suffix) = path.split_at(cut);
    let matches = suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(ext);
    (matches && !stem.ends_with('/')).then_some(stem)
}

/// `serve_` followed by the path with non-alphanumerics replaced by `_`.
pub fn handler_ident(relative_path: &str) -> String {
    let mut ident = String::with_capacity(relative_path.len() + 6);
    ident.push_str("serve_");
    ident.extend(relative_path.chars().map(|c| {
        if c.is_ascii_alphanumeric() { c } else { '_' }
    }));
    ident
}

/// Reject names the router would read as parameters or wildcards.
fn validate(route: &str, relative_path: &str) -> Result<(), RouteError> {
    if let Some(ch) = route.chars().find(|c| matches!(c, '{' | '}')) {
        return Err(RouteError::InvalidCharacter {
            path: relative_path.to_string(),
            route: route.to_string(),
            ch,
        });
    }
    if let Some(prefix) = route
        .split('/')
        .filter_map(|segment| segment.chars().next())
        .find(|c| matches!(c, ':' | '*'))
    {
        return Err(RouteError::ReservedSegment {
            path: relative_path.to_string(),
            route: route.to_string(),
            prefix,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(path: &str, ext: &str) -> FileArtifact {
        FileArtifact {
            class_name: "assets".into(),
            relative_path: path.into(),
            extension: ext.into(),
            content: "\"\"".into(),
            remove_route_extension: false,
            cache_control: None,
            should_minify: false,
        }
    }

    #[test]
    fn test_route_name_normalization() {
        assert_eq!(route_name("index.html", "html", false), "");
        assert_eq!(route_name("index.htm", "htm", true), "");
        assert_eq!(route_name("blog/index.htm", "htm", false), "blog");
        assert_eq!(route_name("a/b/index.html", "html", true), "a/b");
        assert_eq!(route_name("about.html", "html", true), "about");
        assert_eq!(route_name("about.html", "html", false), "about.html");
    }

    #[test]
    fn test_route_name_backslashes() {
        assert_eq!(route_name(r"blog\index.html", "html", false), "blog");
        assert_eq!(route_name(r"css\site.css", "css", false), "css/site.css");
    }

    #[test]
    fn test_remove_extension_edge_cases() {
        assert_eq!(route_name("Logo.PNG", "png", true), "Logo");
        assert_eq!(route_name("Makefile", "", true), "Makefile");
        assert_eq!(route_name("dir/.css", "css", true), "dir/.css");
        assert_eq!(route_name("js", "js", true), "js");
    }

    #[test]
    fn test_handler_ident() {
        assert_eq!(handler_ident("www/index.html"), "serve_www_index_html");
        assert_eq!(handler_ident("img/my-logo.png"), "serve_img_my_logo_png");
    }

    #[test]
    fn test_derive_descriptor() {
        let mut art = artifact("blog/post.html", "html");
        art.remove_route_extension = true;

        let route = derive(&art, None).unwrap();
        assert_eq!(route.route_name, "blog/post");
        assert_eq!(route.handler, "serve_blog_post_html");
        assert_eq!(route.mime, mime::types::HTML);
        assert_eq!(route.cache_control, "");
        assert_eq!(route.priority, 0);
        assert_eq!(route.depth, 1);
    }

    #[test]
    fn test_cache_control_fallback() {
        let mut art = artifact("app.js", "js");
        assert_eq!(derive(&art, Some("max-age=60")).unwrap().cache_control, "max-age=60");

        art.cache_control = Some("no-store".into());
        assert_eq!(derive(&art, Some("max-age=60")).unwrap().cache_control, "no-store");
    }

    #[test]
    fn test_invalid_routes_rejected() {
        let err = derive(&artifact("docs/{lang}.html", "html"), None).unwrap_err();
        assert!(matches!(err, RouteError::InvalidCharacter { ch: '{', .. }));
        assert_eq!(err.path(), "docs/{lang}.html");

        let err = derive(&artifact("users/:id.json", "json"), None).unwrap_err();
        assert!(matches!(err, RouteError::ReservedSegment { prefix: ':', .. }));
    }

    #[test]
    fn test_plain_file_names_get_routes() {
        let route = derive(&artifact("my page.html", "html"), None).unwrap();
        assert_eq!(route.route_name, "my page.html");
        assert_eq!(route.handler, "serve_my_page_html");

        let route = derive(&artifact("say \"hi\".txt", "txt"), None).unwrap();
        assert_eq!(route.route_name, "say \"hi\".txt");
    }
}
