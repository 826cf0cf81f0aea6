//! Request-time routing errors.

use thiserror::Error;

/// Errors returned by [`Router::route`](crate::routing::Router::route).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No bucket for the method/length pair, or no candidate survived scoring.
    /// A normal client-facing failure.
    #[error("Invalid API path")]
    NotFound { method: String, path: String },

    /// The matched route's parameter names disagree with the path length.
    /// Only reachable through a bug in discovery or bucketing.
    #[error("route '{route}' declares {expected} parameter positions but the path has {actual}")]
    ParameterArity {
        route: String,
        expected: usize,
        actual: usize,
    },
}

impl RoutingError {
    pub fn not_found(method: impl Into<String>, path: impl Into<String>) -> Self {
        RoutingError::NotFound {
            method: method.into(),
            path: path.into(),
        }
    }

    /// True for failures that indicate a bug rather than a bad request.
    pub fn is_internal(&self) -> bool {
        matches!(self, RoutingError::ParameterArity { .. })
    }
}
