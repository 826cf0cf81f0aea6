//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use api_router::cache::{CacheStore, MemoryStore, RouteCache};
use api_router::config::RouterConfig;
use api_router::http::{DescribeDispatcher, HttpServer};
use api_router::routing::{RouteDeclaration, RouteDiscoverer, RouteSource, Router, StaticRouteSource};

/// Route cache over one static source per `(name, routes)` pair, in order.
pub fn cache_with(sources: Vec<(&str, Vec<RouteDeclaration>)>, store: Box<dyn CacheStore>) -> Arc<RouteCache> {
    let mut discoverer = RouteDiscoverer::new("?");
    for (name, routes) in sources {
        let source: Arc<dyn RouteSource> = Arc::new(StaticRouteSource::new(name, routes));
        discoverer.add_source(source);
    }
    Arc::new(RouteCache::new(discoverer, store))
}

/// Router over a single source held in memory.
pub fn router_with(routes: Vec<RouteDeclaration>) -> Router {
    Router::new(cache_with(vec![("test", routes)], Box::new(MemoryStore::new())))
}

/// HTTP server answering with `DescribeDispatcher`.
pub fn server_with(config: RouterConfig, router: Arc<Router>) -> HttpServer {
    HttpServer::new(config, router, Arc::new(DescribeDispatcher))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A snapshot path under the system temp directory, unique per call.
pub fn temp_snapshot_path() -> PathBuf {
    std::env::temp_dir().join(format!("api-router-test-{}.json", uuid::Uuid::new_v4()))
}
