//! Handing a resolved route to whatever executes it.
//!
//! The router only knows handler identifiers. Turning a `(class, method)`
//! pair into a call belongs to a `Dispatcher`; the built-in one describes
//! the resolution as JSON, which is what the admin tooling and tests use.

use axum::{
    body::Bytes,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::routing::params::PathParams;
use crate::routing::router::ResolvedRoute;

/// Everything a handler needs from the HTTP request.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub request_id: String,
    pub route: ResolvedRoute,
    pub query: Option<String>,
    pub body: Bytes,
}

/// Executes resolved routes.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, request: DispatchRequest) -> Response;
}

/// Answers with the resolved handler and parameters instead of running it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescribeDispatcher;

#[derive(Debug, Serialize)]
struct Description<'a> {
    request_id: &'a str,
    handler_class: &'a str,
    handler_method: &'a str,
    pattern: &'a str,
    parameters: &'a PathParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    body_bytes: usize,
}

impl Dispatcher for DescribeDispatcher {
    fn dispatch(&self, request: DispatchRequest) -> Response {
        Json(Description {
            request_id: &request.request_id,
            handler_class: &request.route.handler.class,
            handler_method: &request.route.handler.method,
            pattern: &request.route.pattern,
            parameters: &request.route.parameters,
            query: request.query.as_deref(),
            body_bytes: request.body.len(),
        })
        .into_response()
    }
}
