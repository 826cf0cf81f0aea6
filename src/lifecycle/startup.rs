//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn configuration into route sources
//! - Assemble the route cache and the request router
//! - Warm the route table before listeners accept traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Source order is fixed: generic CRUD first, then controllers, then models.
//!   Ordinals follow this order, so it also decides tie-breaks
//! - Listeners start last (traffic only when the table is published)

use std::sync::Arc;

use crate::cache::{store_from_config, RebuildReport, RouteCache};
use crate::config::RouterConfig;
use crate::routing::{
    CrudControllerSource, ModelRouteSource, RouteDiscoverer, RouteSource, Router, StaticRouteSource,
};

/// Route sources in registration order.
pub fn build_sources(config: &RouterConfig) -> Vec<Arc<dyn RouteSource>> {
    let mut sources: Vec<Arc<dyn RouteSource>> = Vec::new();

    if config.routing.generic_crud {
        sources.push(Arc::new(CrudControllerSource::new(
            config.routing.crud_handler_class.clone(),
        )));
    }
    for controller in &config.controllers {
        sources.push(Arc::new(StaticRouteSource::from_config(controller)));
    }
    for model in &config.models {
        sources.push(Arc::new(ModelRouteSource::from_config(model)));
    }

    sources
}

/// Route cache backed by the configured store, with every configured source.
pub fn build_cache(config: &RouterConfig) -> RouteCache {
    let mut discoverer = RouteDiscoverer::from_config(&config.routing);
    for source in build_sources(config) {
        discoverer.add_source(source);
    }
    RouteCache::new(discoverer, store_from_config(&config.cache))
}

/// Everything the listeners need, assembled from one configuration.
#[derive(Debug)]
pub struct Application {
    pub config: RouterConfig,
    pub cache: Arc<RouteCache>,
    pub router: Arc<Router>,
}

impl Application {
    pub fn new(config: RouterConfig) -> Self {
        let cache = Arc::new(build_cache(&config));
        let router = Arc::new(Router::from_config(cache.clone(), &config.routing));
        Self {
            config,
            cache,
            router,
        }
    }

    /// Publish a route table: the persisted snapshot when one is usable,
    /// otherwise a fresh discovery. `force_rebuild` skips the snapshot.
    ///
    /// Blocks on discovery; call from the blocking pool in async code.
    pub fn warm(&self, force_rebuild: bool) -> Option<RebuildReport> {
        if force_rebuild {
            return Some(self.cache.rebuild());
        }
        let table = self.cache.load();
        tracing::debug!(routes = table.len(), "Route table warm");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    const CONFIG: &str = r#"
[routing]
crud_handler_class = "GenericController"

[[controllers]]
name = "AuthController"
routes = [
    { method = "POST", path = "/login", handler_method = "login" },
]

[[models]]
name = "Invoice"
routes = [
    { method = "GET", path = "/Invoice/?/pdf", handler_method = "pdf", parameter_names = ["id"] },
]
"#;

    #[test]
    fn test_sources_follow_registration_order() {
        let config = parse_config(CONFIG).unwrap();
        let names: Vec<String> = build_sources(&config)
            .iter()
            .map(|s| s.name().to_string())
            .collect();

        assert_eq!(names.len(), 3);
        assert_eq!(names[1], "AuthController");
        assert_eq!(names[2], "Invoice");
    }

    #[test]
    fn test_generic_crud_can_be_disabled() {
        let mut config = parse_config(CONFIG).unwrap();
        config.routing.generic_crud = false;
        assert_eq!(build_sources(&config).len(), 2);
    }

    #[test]
    fn test_application_warms_and_routes() {
        let app = Application::new(parse_config(CONFIG).unwrap());
        assert!(app.warm(false).is_none());
        assert!(app.cache.current().is_some());

        let resolved = app.router.route("GET", "/Invoice/7/pdf").unwrap();
        assert_eq!(resolved.handler.to_string(), "Invoice::pdf");
        assert_eq!(resolved.parameters.get("id").map(String::as_str), Some("7"));

        let report = app.warm(true).expect("forced rebuild reports");
        assert_eq!(report.routes, app.cache.current().unwrap().len());
    }
}
