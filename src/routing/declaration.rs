//! Raw route declarations and the sources that produce them.
//!
//! A declaration is what a controller or model hands over before any
//! validation: method and path are plain strings, parameter names are
//! optional. Turning declarations into definitions is discovery's job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A route as declared by a source, prior to normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteDeclaration {
    /// HTTP method name, e.g. "GET".
    pub method: String,

    /// `/`-delimited path; `?` (or `:name`) marks a wildcard segment.
    pub path: String,

    pub handler_class: String,

    pub handler_method: String,

    /// Binding names, either one per wildcard or one per segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_names: Option<Vec<String>>,
}

impl RouteDeclaration {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        handler_class: impl Into<String>,
        handler_method: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            handler_class: handler_class.into(),
            handler_method: handler_method.into(),
            parameter_names: None,
        }
    }

    pub fn with_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

impl fmt::Display for RouteDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}::{}",
            self.method, self.path, self.handler_class, self.handler_method
        )
    }
}

/// Anything that registers routes: controllers, models, configuration.
pub trait RouteSource: Send + Sync + fmt::Debug {
    /// Name used in logs and in each definition's `source` field.
    fn name(&self) -> &str;

    /// Every route this source declares, in declaration order.
    fn register_routes(&self) -> Vec<RouteDeclaration>;
}
