//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the API catch-all handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Dispatch requests through the routing engine
//! - Map routing failures to HTTP responses

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RouterConfig;
use crate::http::dispatch::{DispatchRequest, Dispatcher};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::error_response;
use crate::routing::Router as ApiRouter;

/// Maximum request body handed to a dispatcher.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ApiRouter>,
    pub dispatcher: Arc<dyn Dispatcher>,
    pub api_prefix: Arc<str>,
}

/// HTTP server for the API.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RouterConfig, router: Arc<ApiRouter>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        let state = AppState {
            router,
            dispatcher,
            api_prefix: Arc::from(config.routing.api_prefix.as_str()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        let prefix = config.routing.api_prefix.as_str();
        let root = if prefix.is_empty() { "/" } else { prefix };
        let catch_all = format!("{}/{{*path}}", prefix);

        Router::new()
            .route(&catch_all, any(api_handler))
            .route(root, any(api_handler))
            .fallback(outside_api)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request.request_id(),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The fully layered Axum router; used by tests to drive requests directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until shutdown is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_prefix = %self.config.routing.api_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Anything outside the API prefix.
async fn outside_api() -> Response {
    error_response(StatusCode::NOT_FOUND, "Invalid API path")
}

/// API entry point: resolve the route, then hand off to the dispatcher.
async fn api_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.request_id().to_string();
    let full_path = request.uri().path();
    let path = full_path
        .strip_prefix(&*state.api_prefix)
        .unwrap_or(full_path)
        .to_string();
    let method = request.method().as_str().to_string();
    let query = request.uri().query().map(str::to_string);

    let route = match state.router.route(&method, &path) {
        Ok(route) => route,
        Err(e) if e.is_internal() => {
            tracing::error!(request_id = %request_id, method = %method, path = %path, error = %e, "Routing invariant violated");
            return e.into_response();
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
            return e.into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        handler = %route.handler,
        pattern = %route.pattern,
        "Dispatching request"
    );

    let body: Bytes = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
    };

    state.dispatcher.dispatch(DispatchRequest {
        request_id,
        route,
        query,
        body,
    })
}
