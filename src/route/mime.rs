//! Content-Type lookup for served artifacts.

/// Content-Type values used by generated handlers.
pub mod types {
    // Text
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";

    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const BMP: &str = "image/bmp";
}

/// Content-Type for a lowercase extension (no dot).
///
/// Anything unmapped is served as plain text.
pub fn from_extension(ext: &str) -> &'static str {
    match ext {
        "html" | "htm" => types::HTML,
        "css" => types::CSS,
        "js" | "mjs" => types::JAVASCRIPT,
        "json" => types::JSON,
        "xml" => types::XML,

        "png" => types::PNG,
        "jpg" | "jpeg" => types::JPEG,
        "gif" => types::GIF,
        "webp" => types::WEBP,
        "svg" => types::SVG,
        "ico" => types::ICO,
        "bmp" => types::BMP,

        _ => types::PLAIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(from_extension("html"), types::HTML);
        assert_eq!(from_extension("htm"), types::HTML);
        assert_eq!(from_extension("css"), types::CSS);
        assert_eq!(from_extension("js"), types::JAVASCRIPT);
        assert_eq!(from_extension("xml"), types::XML);
        assert_eq!(from_extension("png"), types::PNG);
        assert_eq!(from_extension("jpeg"), types::JPEG);
        assert_eq!(from_extension("ico"), types::ICO);
    }

    #[test]
    fn test_unmapped_is_plain_text() {
        assert_eq!(from_extension("txt"), types::PLAIN);
        assert_eq!(from_extension("wasm"), types::PLAIN);
        assert_eq!(from_extension(""), types::PLAIN);
    }
}
