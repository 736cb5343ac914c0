//! Rust identifiers for generated modules and constants.

/// Keywords that must be written as raw identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers either.
const RESERVED: &[&str] = &["crate", "self", "super", "Self"];

/// snake_case module name for a path segment or class component.
pub fn module_ident(raw: &str) -> String {
    let ident = sanitize(raw, false);
    if RESERVED.contains(&ident.as_str()) {
        format!("_{ident}")
    } else if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else {
        ident
    }
}

/// SCREAMING_SNAKE constant name for a file name.
pub fn const_ident(raw: &str) -> String {
    sanitize(raw, true)
}

fn sanitize(raw: &str, upper: bool) -> String {
    let mut ident: String = raw
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() && upper => c.to_ascii_uppercase(),
            c if c.is_ascii_alphanumeric() => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if ident == "_" {
        ident.push('_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_ident() {
        assert_eq!(module_ident("Blog"), "blog");
        assert_eq!(module_ident("my-pages"), "my_pages");
        assert_eq!(module_ident("2024"), "_2024");
        assert_eq!(module_ident("static"), "r#static");
        assert_eq!(module_ident("self"), "_self");
        assert_eq!(module_ident(""), "__");
    }

    #[test]
    fn test_const_ident() {
        assert_eq!(const_ident("index.html"), "INDEX_HTML");
        assert_eq!(const_ident("my-logo.png"), "MY_LOGO_PNG");
        assert_eq!(const_ident("404.html"), "_404_HTML");
        assert_eq!(const_ident("_"), "__");
    }
}
