use thiserror::Error;

/// A route that cannot be registered. Only that route is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route `/{route}` contains {ch:?}, which the router reads as a parameter")]
    InvalidCharacter {
        path: String,
        route: String,
        ch: char,
    },

    #[error("route `/{route}` has a segment starting with `{prefix}`")]
    ReservedSegment {
        path: String,
        route: String,
        prefix: char,
    },

    #[error("route `/{route}` is already served by `{existing}`")]
    DuplicateRoute {
        path: String,
        route: String,
        existing: String,
    },

    #[error("handler `{handler}` collides with the handler of `{existing}`")]
    DuplicateHandler {
        path: String,
        handler: String,
        existing: String,
    },
}

impl RouteError {
    /// Relative path of the file whose route was rejected.
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidCharacter { path, .. }
            | Self::ReservedSegment { path, .. }
            | Self::DuplicateRoute { path, .. }
            | Self::DuplicateHandler { path, .. } => path,
        }
    }
}
