//! Minification for HTML, CSS and JS.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. HTML goes through a
//! small whitespace-collapsing pass that hands inline `<style>` and module
//! `<script>` bodies to the other two.
//!
//! Every entry point returns `None` on failure; callers keep the original.

use std::panic::{AssertUnwindSafe, catch_unwind};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::debug;

/// Minify `content` according to its (lowercase) extension.
///
/// Panics inside the minifiers are caught and treated as failure. This
/// relies on the release profile unwinding.
pub fn minify(ext: &str, content: &str) -> Option<String> {
    guarded(ext, || match ext {
        "html" | "htm" => minify_html(content),
        "css" => minify_css(content),
        "js" => minify_js(content),
        _ => None,
    })
}

fn guarded(ext: &str, run: impl FnOnce() -> Option<String>) -> Option<String> {
    match catch_unwind(AssertUnwindSafe(run)) {
        Ok(out) => out,
        Err(_) => {
            debug!("minify"; "minifier panicked on .{} input", ext);
            None
        }
    }
}

/// How the browser loads a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptKind {
    /// `<script src>`: top-level bindings are globals and must survive.
    Classic,
    /// `<script type="module">` or a file with imports/exports.
    Module,
}

/// Minify a standalone `.js` asset.
///
/// Assets are minified as classic scripts, keeping every top-level name.
/// Sources that only parse as a module are minified as one.
pub fn minify_js(source: &str) -> Option<String> {
    minify_script(source, ScriptKind::Classic)
        .or_else(|| minify_script(source, ScriptKind::Module))
}

fn minify_script(source: &str, kind: ScriptKind) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = match kind {
        ScriptKind::Classic => SourceType::script(),
        ScriptKind::Module => SourceType::mjs(),
    };
    let parsed = Parser::new(&allocator, source, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        return None;
    }

    let mut program = parsed.program;
    // Top-level mangling and dead-code removal follow the source type, so
    // classic scripts keep their globals.
    let minified = Minifier::new(MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    })
    .minify(&allocator, &mut program);

    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program)
        .code;
    Some(code)
}

/// Minify a stylesheet or an inline `<style>` body.
///
/// Rules are rewritten as well as reprinted: overridden declarations go and
/// shorthands are folded. A sheet that does not parse strictly is skipped.
pub fn minify_css(source: &str) -> Option<String> {
    let mut sheet = match StyleSheet::parse(source, ParserOptions::default()) {
        Ok(sheet) => sheet,
        Err(e) => {
            debug!("minify"; "css left as is: {}", e);
            return None;
        }
    };
    if let Err(e) = sheet.minify(MinifyOptions::default()) {
        debug!("minify"; "css left as is: {}", e);
        return None;
    }

    let printer = PrinterOptions {
        minify: true,
        ..PrinterOptions::default()
    };
    sheet.to_css(printer).ok().map(|out| out.code)
}

/// Elements whose body is not markup.
const RAW_TEXT: [&str; 4] = ["pre", "textarea", "style", "script"];

/// Minify an HTML document.
///
/// - plain comments are dropped, conditional comments kept
/// - whitespace inside tags collapses, quoted attribute values are kept
/// - whitespace between two inline elements becomes one space, next to a
///   block element or at either end of the document it is dropped
/// - `pre` and `textarea` bodies are copied verbatim
///
/// Returns `None` for unterminated comments, tags or raw-text elements.
pub fn minify_html(source: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets aligned with `source`.
    let lower = source.to_ascii_lowercase();
    let mut out = String::with_capacity(source.len());
    let mut pos = 0;
    let mut last_tag = "";

    while pos < source.len() {
        let rest = &source[pos..];

        if rest.starts_with("<!--") {
            let end = pos + rest.find("-->")? + 3;
            let comment = &source[pos..end];
            if comment.starts_with("<!--[if") || comment.starts_with("<!--<![endif") {
                out.push_str(comment);
            }
            pos = end;
            continue;
        }

        if rest.starts_with('<') {
            let start = pos;
            pos += tag_end(rest)?;
            push_tag(&mut out, &source[start..pos]);

            let open_tag = &lower[start..pos];
            last_tag = element(open_tag);
            let name = tag_name(open_tag);
            if let Some(name) = RAW_TEXT.iter().find(|raw| **raw == name) {
                let close = pos + lower[pos..].find(&format!("</{name}"))?;
                push_raw_body(&mut out, name, open_tag, &source[pos..close]);
                pos = close;
            }
            continue;
        }

        let end = rest.find('<').map_or(source.len(), |i| pos + i);
        let text = &source[pos..end];
        if text.trim_ascii().is_empty() {
            let next = (end < source.len()).then(|| element(&lower[end..]));
            if next.is_some_and(|next| !is_block(next) && !is_block(last_tag)) {
                out.push(' ');
            }
        } else {
            push_text(&mut out, text);
        }
        pos = end;
    }

    Some(out)
}

/// Byte length of the tag at the start of `rest`, honouring quotes.
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (i, ch) in rest.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Element name of an opening tag, empty for closing tags and doctypes.
fn tag_name(tag: &str) -> &str {
    let inner = &tag[1..];
    let len = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    &inner[..len]
}

/// Element name of any tag (opening or closing). Empty for comments,
/// doctypes and processing instructions.
fn element(tag: &str) -> &str {
    let inner = tag[1..].strip_prefix('/').unwrap_or(&tag[1..]);
    let len = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    &inner[..len]
}

/// Elements around which whitespace never renders. Unknown names (and the
/// empty name of doctypes) count as block so spacing is only kept between
/// known inline content.
fn is_block(name: &str) -> bool {
    const INLINE: [&str; 28] = [
        "a", "abbr", "b", "bdi", "bdo", "button", "cite", "code", "data", "dfn", "em", "i",
        "img", "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span",
        "strong", "sub", "sup", "time", "u",
    ];
    !INLINE.contains(&name)
}

fn push_tag(out: &mut String, tag: &str) {
    let mut quote = None;
    let mut pending_space = false;
    for ch in tag.chars() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            c if c.is_ascii_whitespace() => pending_space = true,
            '>' => {
                pending_space = false;
                out.push('>');
            }
            _ => {
                if pending_space && !out.ends_with('<') {
                    out.push(' ');
                }
                pending_space = false;
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                }
                out.push(ch);
            }
        }
    }
}

fn push_raw_body(out: &mut String, name: &str, open_tag_lower: &str, body: &str) {
    let minified = match name {
        "style" => minify_css(body),
        "script" if is_module_script(open_tag_lower) => minify_script(body, ScriptKind::Module),
        _ => None,
    };
    out.push_str(minified.as_deref().unwrap_or(body));
}

/// Only module scripts are safe to minify: classic scripts may rely on
/// top-level bindings leaking into the global scope.
fn is_module_script(open_tag_lower: &str) -> bool {
    ["type=\"module\"", "type='module'", "type=module"]
        .iter()
        .any(|attr| open_tag_lower.contains(attr))
}

fn push_text(out: &mut String, text: &str) {
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    if pending_space {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let out = minify_css("a {\n  color: red;\n}\n").unwrap();
        assert_eq!(out, "a{color:red}");

        let out = minify_css("p { margin-top: 1px; margin-top: 2px; }").unwrap();
        assert_eq!(out, "p{margin-top:2px}");
    }

    #[test]
    fn test_minify_js_drops_whitespace() {
        let source = "export function add(first, second) {\n    return first + second;\n}\n";
        let out = minify_js(source).unwrap();
        assert!(out.len() < source.len());
        assert!(out.contains("export"));
    }

    #[test]
    fn test_minify_js_keeps_classic_globals() {
        let source = "function greet(name) {\n  alert('hi ' + name);\n}\nvar counter = 0;\n";
        let out = minify("js", source).unwrap();
        assert!(out.contains("greet"), "{out}");
        assert!(out.contains("counter"), "{out}");
        assert!(out.len() < source.len());
    }

    #[test]
    fn test_module_script_in_html_minified() {
        let source = "<script type=\"module\">\n  const answer = 1 + 2;\n  console.log(answer);\n</script>";
        let out = minify_html(source).unwrap();
        assert!(out.starts_with("<script type=\"module\">"));
        assert!(out.ends_with("</script>"));
        assert!(out.len() < source.len());
    }

    #[test]
    fn test_minify_js_syntax_error() {
        assert_eq!(minify_js("function ( {"), None);
    }

    #[test]
    fn test_minifier_panic_is_not_fatal() {
        assert_eq!(guarded("js", || panic!("minifier bug")), None);
        assert_eq!(guarded("css", || Some("a{}".into())), Some("a{}".into()));
    }

    #[test]
    fn test_minify_dispatch_unknown_extension() {
        assert_eq!(minify("txt", "  keep  "), None);
    }

    #[test]
    fn test_html_collapses_whitespace() {
        let source = "<html>\n  <body   class=\"a  b\" >\n    <p>Hello    world</p>\n  </body>\n</html>\n";
        let out = minify_html(source).unwrap();
        assert_eq!(out, "<html><body class=\"a  b\"><p>Hello world</p></body></html>");
    }

    #[test]
    fn test_html_inline_space_kept() {
        let out = minify_html("<p>a <b>b</b> c</p>").unwrap();
        assert_eq!(out, "<p>a <b>b</b> c</p>");
    }

    #[test]
    fn test_html_newline_between_inline_elements() {
        let out = minify_html("<p><b>a</b>\n<i>b</i></p>").unwrap();
        assert_eq!(out, "<p><b>a</b> <i>b</i></p>");
    }

    #[test]
    fn test_html_whitespace_between_blocks_dropped() {
        let source = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n";
        assert_eq!(minify_html(source).unwrap(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_html_comments() {
        let out = minify_html("<p>x</p><!-- note --><!--[if IE]>ie<![endif]-->").unwrap();
        assert_eq!(out, "<p>x</p><!--[if IE]>ie<![endif]-->");
    }

    #[test]
    fn test_html_pre_preserved() {
        let source = "<div>\n<pre>  a\n    b  </pre>\n</div>";
        let out = minify_html(source).unwrap();
        assert_eq!(out, "<div><pre>  a\n    b  </pre></div>");
    }

    #[test]
    fn test_html_inline_style_minified() {
        let out = minify_html("<style>\n  a { color: red; }\n</style>").unwrap();
        assert_eq!(out, "<style>a{color:red}</style>");
    }

    #[test]
    fn test_html_classic_script_untouched() {
        let source = "<script>\n  var x = 1;\n</script>";
        assert_eq!(minify_html(source).unwrap(), source);
    }

    #[test]
    fn test_html_uppercase_raw_element() {
        let source = "<PRE> a  b </PRE>";
        assert_eq!(minify_html(source).unwrap(), source);
    }

    #[test]
    fn test_html_malformed() {
        assert_eq!(minify_html("<p>ok</p><!-- open"), None);
        assert_eq!(minify_html("<div class=\"x"), None);
        assert_eq!(minify_html("<pre>never closed"), None);
        assert_eq!(minify("html", "<div class=\"x"), None);
    }
}
