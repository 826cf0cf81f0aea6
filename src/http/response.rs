//! Error responses.
//!
//! # Responsibilities
//! - Map routing errors to HTTP status codes
//! - Render a uniform JSON error body
//!
//! # Design Decisions
//! - Internal invariant violations never leak details to the client

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::routing::error::RoutingError;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Build a JSON error response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for RoutingError {
    fn into_response(self) -> Response {
        match self {
            RoutingError::NotFound { .. } => error_response(StatusCode::NOT_FOUND, "Invalid API path"),
            RoutingError::ParameterArity { .. } => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal routing error")
            }
        }
    }
}
