//! Rust source generation for built artifacts.
//!
//! Two files are written to the output directory:
//!
//! - `assets.rs`: one module tree holding every artifact as a constant,
//!   `namespace::class::dirs::FILE_EXT`
//! - `routes.rs`: axum handlers plus `routes()`, only when routes are on
//!
//! Both are meant to be pulled into the host crate with `include!`, side by
//! side in the same module.

mod error;
mod ident;
mod template;
mod write;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

pub use error::EmitError;
pub use ident::{const_ident, module_ident};
pub use write::{WriteOutcome, remove_stale, write_if_changed};

use crate::config::GlobalOptions;
use crate::debug;
use crate::graph::BuildOutput;
use crate::route::RouteTable;
use crate::transform::{FileArtifact, text_literal};

use template::{ASSETS_RS, AssetsVars, HANDLER_RS, HandlerVars, ROUTES_RS, RoutesVars};

pub const ASSETS_FILE: &str = "assets.rs";
pub const ROUTES_FILE: &str = "routes.rs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// `pub const NAME: &str`
    Text,
    /// `pub static NAME: &[u8]`
    Bytes,
}

/// One generated declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitUnit<'a> {
    pub namespace: &'a str,
    pub visibility: &'a str,
    /// Module path below the namespace: class components, then directories.
    pub class_path: Vec<String>,
    pub member: String,
    pub kind: MemberKind,
    pub literal: &'a str,
    pub relative_path: &'a str,
}

impl<'a> EmitUnit<'a> {
    pub fn new(artifact: &'a FileArtifact, global: &'a GlobalOptions) -> Self {
        let mut class_path: Vec<String> = artifact
            .class_name
            .split('.')
            .filter(|s| !s.is_empty())
            .map(module_ident)
            .collect();

        let mut segments: Vec<&str> = artifact.relative_path.split('/').collect();
        let file_name = segments.pop().unwrap_or_default();
        class_path.extend(segments.iter().filter(|s| !s.is_empty()).map(|s| module_ident(s)));

        Self {
            namespace: &global.namespace,
            visibility: &global.visibility,
            class_path,
            member: const_ident(file_name),
            kind: if artifact.kind().is_binary() {
                MemberKind::Bytes
            } else {
                MemberKind::Text
            },
            literal: &artifact.content,
            relative_path: &artifact.relative_path,
        }
    }

    fn declaration(&self, member: &str) -> String {
        match self.kind {
            MemberKind::Text => format!("pub const {member}: &str = {};", self.literal),
            MemberKind::Bytes => format!("pub static {member}: &[u8] = {};", self.literal),
        }
    }
}

/// Rendered file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub assets: String,
    /// `None` when routes are disabled.
    pub routes: Option<String>,
}

/// What [`emit`] did with each output file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

/// Render and write the generated sources under `out_dir`.
pub fn emit(
    output: &BuildOutput,
    global: &GlobalOptions,
    out_dir: &Path,
) -> Result<EmitReport, EmitError> {
    let mut report = EmitReport::default();
    let assets_path = out_dir.join(ASSETS_FILE);
    let routes_path = out_dir.join(ROUTES_FILE);

    if !output.has_changes() && assets_path.is_file() && (routes_path.is_file() == global.routes) {
        debug!("emit"; "no changes, skipping render");
        report.unchanged.push(assets_path);
        if global.routes {
            report.unchanged.push(routes_path);
        }
        return Ok(report);
    }

    let rendered = render(output, global);
    record(&mut report, &assets_path, write_if_changed(&assets_path, &rendered.assets)?);
    match rendered.routes {
        Some(routes) => record(&mut report, &routes_path, write_if_changed(&routes_path, &routes)?),
        None => {
            if remove_stale(&routes_path)? {
                report.removed.push(routes_path);
            }
        }
    }
    Ok(report)
}

fn record(report: &mut EmitReport, path: &Path, outcome: WriteOutcome) {
    match outcome {
        WriteOutcome::Written => report.written.push(path.to_path_buf()),
        WriteOutcome::Unchanged => report.unchanged.push(path.to_path_buf()),
    }
}

/// Render both files without touching the filesystem.
pub fn render(output: &BuildOutput, global: &GlobalOptions) -> Rendered {
    let (tree, constants) = ModuleTree::build(output, global);
    let assets = ASSETS_RS.render(&AssetsVars {
        body: &tree.render_root(&global.visibility),
    });
    let routes = global
        .routes
        .then(|| render_routes(&output.table, &constants, global));
    Rendered { assets, routes }
}

/// Nested modules, merged across artifacts.
#[derive(Default)]
struct ModuleTree {
    items: Vec<String>,
    members: FxHashMap<String, usize>,
    children: BTreeMap<String, ModuleTree>,
}

impl ModuleTree {
    /// Tree of every artifact plus `relative path → constant path`.
    fn build(output: &BuildOutput, global: &GlobalOptions) -> (Self, FxHashMap<String, String>) {
        let namespace: Vec<String> = global
            .namespace
            .split('.')
            .filter(|s| !s.is_empty())
            .map(module_ident)
            .collect();

        let mut root = Self::default();
        let mut constants = FxHashMap::default();
        for artifact in output.artifacts.iter().map(|a| &a.artifact) {
            let unit = EmitUnit::new(artifact, global);
            let path: Vec<&str> = namespace
                .iter()
                .chain(unit.class_path.iter())
                .map(String::as_str)
                .collect();

            let member = root.node(&path).insert(&unit);
            let mut full = path.join("::");
            full.push_str("::");
            full.push_str(&member);
            constants.insert(artifact.relative_path.clone(), full);
        }
        (root, constants)
    }

    fn node(&mut self, path: &[&str]) -> &mut Self {
        match path.split_first() {
            None => self,
            Some((head, rest)) => self
                .children
                .entry((*head).to_string())
                .or_default()
                .node(rest),
        }
    }

    /// Add a declaration, suffixing the name on collision. Returns the name.
    fn insert(&mut self, unit: &EmitUnit<'_>) -> String {
        let count = self.members.entry(unit.member.clone()).or_insert(0);
        *count += 1;
        let member = if *count == 1 {
            unit.member.clone()
        } else {
            debug!("emit"; "{} renamed to {}_{} to avoid a collision", unit.relative_path, unit.member, count);
            format!("{}_{}", unit.member, count)
        };
        self.items.push(format!(
            "/// `{}`\n{}",
            unit.relative_path,
            unit.declaration(&member)
        ));
        member
    }

    fn render_root(&self, visibility: &str) -> String {
        let mut out = String::new();
        for (name, child) in &self.children {
            out.push_str("#[allow(dead_code)]\n");
            child.render_into(&mut out, visibility, name, 0);
        }
        for item in &self.items {
            out.push_str(item);
            out.push('\n');
        }
        out
    }

    fn render_into(&self, out: &mut String, visibility: &str, name: &str, depth: usize) {
        let indent = "    ".repeat(depth);
        out.push_str(&format!("{indent}{visibility} mod {name} {{\n"));
        let inner = "    ".repeat(depth + 1);
        for item in &self.items {
            // Only the first line is indented; literal bodies stay verbatim.
            out.push_str(&inner);
            out.push_str(&item.replacen('\n', &format!("\n{inner}"), 1));
            out.push('\n');
        }
        for (child_name, child) in &self.children {
            child.render_into(out, "pub", child_name, depth + 1);
        }
        out.push_str(&indent);
        out.push_str("}\n");
    }
}

fn render_routes(
    table: &RouteTable,
    constants: &FxHashMap<String, String>,
    global: &GlobalOptions,
) -> String {
    let mut handlers = String::new();
    let mut registrations = String::new();

    for route in table.iter() {
        let Some(constant) = constants.get(&route.relative_path) else {
            continue;
        };

        let mut headers = format!("(header::CONTENT_TYPE, {})", text_literal(route.mime));
        if !route.cache_control.is_empty() {
            headers.push_str(&format!(
                ", (header::CACHE_CONTROL, {})",
                text_literal(&route.cache_control)
            ));
        }
        handlers.push_str(&HANDLER_RS.render(&HandlerVars {
            handler: &route.handler,
            headers: &headers,
            constant: &format!("super::{constant}"),
        }));
        registrations.push_str(&format!(
            "            .route({}, get({}))\n",
            text_literal(&format!("/{}", route.route_name)),
            route.handler
        ));
    }

    let module = format!("{}_routes", routes_prefix(&global.namespace));
    ROUTES_RS.render(&RoutesVars {
        visibility: &global.visibility,
        module: &module,
        handlers: &handlers,
        registrations: &registrations,
    })
}

/// First namespace component, without any raw-identifier prefix.
fn routes_prefix(namespace: &str) -> String {
    let first = namespace.split('.').find(|s| !s.is_empty()).unwrap_or("embedkit");
    module_ident(first).trim_start_matches("r#").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileOptions;
    use crate::diagnostic::CollectSink;
    use crate::graph::IncrementalGraph;
    use crate::input::memory::MemoryFile;
    use std::fs;
    use tempfile::TempDir;

    fn file(path: &str, class: &str, content: &[u8]) -> FileOptions {
        let mut options = FileOptions::new(MemoryFile::shared(path, content.to_vec()));
        options.class = Some(class.into());
        options
    }

    fn global(routes: bool) -> GlobalOptions {
        GlobalOptions {
            namespace: "assets".into(),
            visibility: "pub".into(),
            routes,
            project_dir: Some("/site".into()),
            ..GlobalOptions::default()
        }
    }

    fn build(files: &[FileOptions], global: &GlobalOptions) -> BuildOutput {
        IncrementalGraph::new().build_at(files, global, 1, &CollectSink::new())
    }

    #[test]
    fn test_emit_unit() {
        let global = global(false);
        let output = build(&[file("/site/www/img/logo.png", "site.static", &[1, 2])], &global);
        let unit = EmitUnit::new(&output.artifacts[0].artifact, &global);

        assert_eq!(unit.class_path, ["site", "r#static", "www", "img"]);
        assert_eq!(unit.member, "LOGO_PNG");
        assert_eq!(unit.kind, MemberKind::Bytes);
        assert_eq!(unit.literal, "&[1, 2]");
    }

    #[test]
    fn test_render_assets_tree() {
        let global = global(false);
        let output = build(
            &[
                file("/site/index.html", "pages", b"<p>hi</p>"),
                file("/site/blog/index.html", "pages", b"blog"),
                file("/site/logo.png", "images", &[7]),
            ],
            &global,
        );
        let rendered = render(&output, &global);

        let expected = "\
// @generated by embedkit. Do not edit.

#[allow(dead_code)]
pub mod assets {
    pub mod images {
        /// `logo.png`
        pub static LOGO_PNG: &[u8] = &[7];
    }
    pub mod pages {
        /// `index.html`
        pub const INDEX_HTML: &str = \"<p>hi</p>\";
        pub mod blog {
            /// `blog/index.html`
            pub const INDEX_HTML: &str = \"blog\";
        }
    }
}

";
        assert_eq!(rendered.assets, expected);
        assert_eq!(rendered.routes, None);
    }

    #[test]
    fn test_member_collision_suffixed() {
        let global = global(false);
        let output = build(
            &[file("/site/a-b.css", "css", b""), file("/site/a_b.css", "css", b"")],
            &global,
        );
        let rendered = render(&output, &global);
        assert!(rendered.assets.contains("pub const A_B_CSS: &str"));
        assert!(rendered.assets.contains("pub const A_B_CSS_2: &str"));
    }

    #[test]
    fn test_render_routes() {
        let mut global = global(true);
        global.cache_control = Some("max-age=60".into());
        let mut about = file("/site/about.html", "pages", b"about");
        about.remove_route_extension = true;
        about.cache_control = Some("no-cache".into());
        let output = build(
            &[file("/site/app.js", "js", b""), about, file("/site/index.html", "pages", b"")],
            &global,
        );

        let routes = render(&output, &global).routes.unwrap();
        assert!(routes.contains("pub mod assets_routes {"));
        assert!(routes.contains(
            "pub async fn serve_about_html() -> impl IntoResponse {\n        \
             ([(header::CONTENT_TYPE, \"text/html; charset=utf-8\"), \
             (header::CACHE_CONTROL, \"no-cache\")], super::assets::pages::ABOUT_HTML)"
        ));
        assert!(routes.contains("(header::CACHE_CONTROL, \"max-age=60\")], super::assets::js::APP_JS)"));

        let about_at = routes.find(".route(\"/about\", get(serve_about_html))").unwrap();
        let root_at = routes.find(".route(\"/\", get(serve_index_html))").unwrap();
        let js_at = routes.find(".route(\"/app.js\", get(serve_app_js))").unwrap();
        assert!(about_at < root_at && root_at < js_at);
    }

    #[test]
    fn test_emit_writes_only_changes() {
        let dir = TempDir::new().unwrap();
        let graph = IncrementalGraph::new();
        let page = MemoryFile::shared("/site/index.html", "v1");
        let mut options = FileOptions::new(page.clone());
        options.class = Some("pages".into());
        let files = [options];
        let sink = CollectSink::new();

        let on = global(true);
        let first = emit(&graph.build_at(&files, &on, 1, &sink), &on, dir.path()).unwrap();
        assert_eq!(first.written.len(), 2);

        let second = emit(&graph.build_at(&files, &on, 1, &sink), &on, dir.path()).unwrap();
        assert!(second.written.is_empty());
        assert_eq!(second.unchanged.len(), 2);

        page.set("v2");
        let third = emit(&graph.build_at(&files, &on, 1, &sink), &on, dir.path()).unwrap();
        assert_eq!(third.written, [dir.path().join(ASSETS_FILE)]);
        assert!(fs::read_to_string(dir.path().join(ASSETS_FILE)).unwrap().contains("\"v2\""));

        let off = global(false);
        let fourth = emit(&graph.build_at(&files, &off, 1, &sink), &off, dir.path()).unwrap();
        assert_eq!(fourth.removed, [dir.path().join(ROUTES_FILE)]);
    }

    #[test]
    fn test_emit_rerenders_after_namespace_change() {
        let dir = TempDir::new().unwrap();
        let graph = IncrementalGraph::new();
        let mut options = FileOptions::new(MemoryFile::shared("/site/a.css", "a{}"));
        options.class = Some("styles".into());
        let files = [options];
        let sink = CollectSink::new();

        let old = GlobalOptions {
            namespace: "old_ns".into(),
            ..global(false)
        };
        emit(&graph.build_at(&files, &old, 1, &sink), &old, dir.path()).unwrap();

        let new = GlobalOptions {
            namespace: "new_ns".into(),
            visibility: "pub(crate)".into(),
            ..global(false)
        };
        let report = emit(&graph.build_at(&files, &new, 1, &sink), &new, dir.path()).unwrap();
        assert_eq!(report.written, [dir.path().join(ASSETS_FILE)]);

        let assets = fs::read_to_string(dir.path().join(ASSETS_FILE)).unwrap();
        assert!(assets.contains("pub(crate) mod new_ns"));
        assert!(!assets.contains("old_ns"));
    }
}
