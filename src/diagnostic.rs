//! Non-fatal build warnings.
//!
//! A diagnostic never stops a build: the affected artifact or route is
//! skipped and every other file proceeds.

use std::error::Error;
use std::fmt;

#[cfg(test)]
use parking_lot::Mutex;

use crate::log;
use crate::route::RouteError;
use crate::transform::FileProcessingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// A file (or a template it includes) could not be read.
    FileProcessing,
    /// A route could not be derived or registered.
    RouteGeneration,
}

impl DiagnosticCode {
    pub const fn id(self) -> &'static str {
        match self {
            Self::FileProcessing => "EK0001",
            Self::RouteGeneration => "EK0002",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::FileProcessing => "file processing error",
            Self::RouteGeneration => "route generation error",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One warning, tied to an input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    /// Relative path of the offending file.
    pub path: String,
    pub details: String,
}

impl Diagnostic {
    pub fn file_processing(path: impl Into<String>, error: &FileProcessingError) -> Self {
        Self {
            code: DiagnosticCode::FileProcessing,
            path: path.into(),
            details: error_chain(error),
        }
    }

    pub fn route_generation(error: &RouteError) -> Self {
        Self {
            code: DiagnosticCode::RouteGeneration,
            path: error.path().to_string(),
            details: error_chain(error),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}: {}",
            self.code,
            self.code.title(),
            self.path,
            self.details
        )
    }
}

/// `error: cause: cause ...`
fn error_chain(error: &dyn Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Receiver of build warnings.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Prints each diagnostic through the logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        log!("warning"; "{}", diagnostic);
    }
}

/// Keeps diagnostics in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CollectSink {
    items: Mutex<Vec<Diagnostic>>,
}

#[cfg(test)]
impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.items.lock())
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

#[cfg(test)]
impl DiagnosticSink for CollectSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.items.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_file_processing_message() {
        let error = FileProcessingError::Read {
            path: PathBuf::from("/site/a.css"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        let diagnostic = Diagnostic::file_processing("a.css", &error);
        assert_eq!(diagnostic.code.id(), "EK0001");
        assert_eq!(
            diagnostic.to_string(),
            "EK0001 file processing error: a.css: failed to read `/site/a.css`: not found"
        );
    }

    #[test]
    fn test_route_generation_message() {
        let error = RouteError::DuplicateRoute {
            path: "about/index.html".into(),
            route: "about".into(),
            existing: "about.html".into(),
        };
        let diagnostic = Diagnostic::route_generation(&error);
        assert_eq!(diagnostic.code, DiagnosticCode::RouteGeneration);
        assert_eq!(diagnostic.path, "about/index.html");
        assert!(diagnostic.to_string().starts_with("EK0002 route generation error"));
    }

    #[test]
    fn test_collect_sink() {
        let sink = CollectSink::new();
        assert!(sink.is_empty());
        sink.report(Diagnostic {
            code: DiagnosticCode::FileProcessing,
            path: "x".into(),
            details: "boom".into(),
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }
}
