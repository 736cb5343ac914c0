//! Rust literal encoding for artifact bodies.

use std::fmt::Write;

/// Quote `text` as a Rust string literal.
///
/// `"` and `\` get a backslash; a bare carriage return is not allowed in a
/// Rust literal and becomes `\r`. Everything else is copied as-is, so
/// multi-line content stays readable in the generated file.
pub fn text_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Encode `bytes` as a byte-slice literal: `&[137, 80, 78, 71]`.
pub fn bytes_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4 + 3);
    out.push_str("&[");
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{byte}");
    }
    out.push(']');
    out
}
