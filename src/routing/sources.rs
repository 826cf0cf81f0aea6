//! Built-in route sources.
//!
//! - `CrudControllerSource`: the generic fallback every model gets for free
//! - `ModelRouteSource`: routes a single model adds on top of the fallback
//! - `StaticRouteSource`: a fixed, named list (configured controllers, tests)

use crate::config::schema::{ControllerConfig, ModelConfig};
use crate::routing::declaration::{RouteDeclaration, RouteSource};

/// Generic CRUD controller. The first wildcard is always the model name.
#[derive(Debug, Clone)]
pub struct CrudControllerSource {
    handler_class: String,
}

impl CrudControllerSource {
    pub fn new(handler_class: impl Into<String>) -> Self {
        Self {
            handler_class: handler_class.into(),
        }
    }
}

impl RouteSource for CrudControllerSource {
    fn name(&self) -> &str {
        &self.handler_class
    }

    fn register_routes(&self) -> Vec<RouteDeclaration> {
        let class = self.handler_class.as_str();
        let route = |method: &str, path: &str, handler: &str, params: &[&str]| {
            RouteDeclaration::new(method, path, class, handler).with_params(params.iter().copied())
        };

        vec![
            route("GET", "/?", "list", &["modelName"]),
            route("POST", "/?", "create", &["modelName"]),
            route("GET", "/?/?", "retrieve", &["modelName", "id"]),
            route("PUT", "/?/?", "update", &["modelName", "id"]),
            route("PATCH", "/?/?", "patch", &["modelName", "id"]),
            // Soft delete: the record is flagged, never removed.
            route("DELETE", "/?/?", "delete", &["modelName", "id"]),
            route("GET", "/?/?/link/?", "listRelated", &["modelName", "id", "", "relationship"]),
            route("POST", "/?/?/link/?", "link", &["modelName", "id", "", "relationship"]),
            route("DELETE", "/?/?/link/?", "unlink", &["modelName", "id", "", "relationship"]),
        ]
    }
}

/// Routes declared by one model.
#[derive(Debug, Clone)]
pub struct ModelRouteSource {
    name: String,
    routes: Vec<RouteDeclaration>,
}

impl ModelRouteSource {
    pub fn new(name: impl Into<String>, routes: Vec<RouteDeclaration>) -> Self {
        Self {
            name: name.into(),
            routes,
        }
    }

    /// Build from a `[[models]]` entry. Routes without their own handler
    /// class fall back to the model's controller, then the model name.
    pub fn from_config(config: &ModelConfig) -> Self {
        let default_class = config
            .controller
            .clone()
            .unwrap_or_else(|| config.name.clone());

        let routes = config
            .routes
            .iter()
            .map(|route| route.to_declaration(&default_class))
            .collect();

        Self::new(config.name.clone(), routes)
    }
}

impl RouteSource for ModelRouteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn register_routes(&self) -> Vec<RouteDeclaration> {
        self.routes.clone()
    }
}

/// A fixed list of declarations under a name.
#[derive(Debug, Clone)]
pub struct StaticRouteSource {
    name: String,
    routes: Vec<RouteDeclaration>,
}

impl StaticRouteSource {
    pub fn new(name: impl Into<String>, routes: Vec<RouteDeclaration>) -> Self {
        Self {
            name: name.into(),
            routes,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        let routes = config
            .routes
            .iter()
            .map(|route| route.to_declaration(&config.name))
            .collect();
        Self::new(config.name.clone(), routes)
    }
}

impl RouteSource for StaticRouteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn register_routes(&self) -> Vec<RouteDeclaration> {
        self.routes.clone()
    }
}
