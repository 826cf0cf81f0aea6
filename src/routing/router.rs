//! Route lookup and dispatch target resolution.
//!
//! # Responsibilities
//! - Normalize the request path
//! - Look up the `(method, length)` bucket in the route cache
//! - Score the candidates and extract parameters for the winner
//! - Return the resolved handler or an explicit not-found
//!
//! # Design Decisions
//! - Linear, synchronous pipeline:
//!   `UNRESOLVED → CANDIDATES_FOUND → SCORED → MATCHED | NOT_FOUND`
//! - No locks on the hot path: the table is an immutable `Arc` snapshot
//! - Explicit not-found rather than a silent default route

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::cache::RouteCache;
use crate::config::schema::RoutingConfig;
use crate::observability::metrics;
use crate::routing::definition::{HandlerId, HttpMethod};
use crate::routing::discovery::split_path;
use crate::routing::error::RoutingError;
use crate::routing::params::{extract_parameters, PathParams};
use crate::routing::scorer::PathScorer;

/// A successfully routed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub method: HttpMethod,
    pub handler: HandlerId,
    /// The winning pattern, wildcards rendered as `?`.
    pub pattern: String,
    pub parameters: PathParams,
}

/// Request-facing entry point of the routing subsystem.
#[derive(Debug, Clone)]
pub struct Router {
    cache: Arc<RouteCache>,
    scorer: PathScorer,
}

impl Router {
    pub fn new(cache: Arc<RouteCache>) -> Self {
        Self {
            cache,
            scorer: PathScorer::default(),
        }
    }

    pub fn from_config(cache: Arc<RouteCache>, config: &RoutingConfig) -> Self {
        Self {
            cache,
            scorer: PathScorer::new(config.case_insensitive),
        }
    }

    pub fn cache(&self) -> &Arc<RouteCache> {
        &self.cache
    }

    /// Resolve `method path` to a handler and its path parameters.
    ///
    /// Anything after the first `?` in `path` is treated as a query string
    /// and ignored.
    pub fn route(&self, method: &str, path: &str) -> Result<ResolvedRoute, RoutingError> {
        let start = Instant::now();
        let result = self.resolve(method, path);

        let outcome = match &result {
            Ok(_) => "matched",
            Err(e) if e.is_internal() => "error",
            Err(_) => "not_found",
        };
        metrics::record_resolution(method, outcome, start);

        result
    }

    fn resolve(&self, method: &str, path: &str) -> Result<ResolvedRoute, RoutingError> {
        let not_found = || RoutingError::not_found(method, path);

        let Ok(http_method) = method.parse::<HttpMethod>() else {
            tracing::trace!(method, path, state = "NOT_FOUND", "Method has no routes");
            return Err(not_found());
        };

        let raw_path = path.split('?').next().unwrap_or_default();
        let segments = split_path(raw_path);
        if segments.iter().any(|s| s.is_empty()) {
            tracing::trace!(method, path, state = "NOT_FOUND", "Empty path segment");
            return Err(not_found());
        }

        let table = self.cache.load();
        let candidates = table.bucket(http_method, segments.len());
        if candidates.is_empty() {
            tracing::trace!(
                method,
                path,
                length = segments.len(),
                state = "NOT_FOUND",
                "No routes of this length"
            );
            return Err(not_found());
        }
        tracing::trace!(
            method,
            path,
            candidates = candidates.len(),
            state = "CANDIDATES_FOUND",
            "Bucket located"
        );

        let Some(scored) = self.scorer.select(candidates, &segments) else {
            tracing::trace!(method, path, state = "NOT_FOUND", "No candidate survived scoring");
            return Err(not_found());
        };
        if scored.tied > 0 {
            tracing::debug!(
                method,
                path,
                route = %scored.route,
                tied = scored.tied,
                "Equal specificity; earliest declaration wins"
            );
        }
        tracing::trace!(
            method,
            path,
            route = %scored.route,
            score = scored.score,
            survivors = scored.survivors,
            state = "SCORED",
            "Candidate selected"
        );

        let parameters = extract_parameters(scored.route, &segments).map_err(|e| {
            tracing::error!(
                method,
                path,
                route = %scored.route,
                error = %e,
                "Parameter extraction invariant violated"
            );
            e
        })?;

        tracing::trace!(method, path, handler = %scored.route.handler(), state = "MATCHED", "Route resolved");

        Ok(ResolvedRoute {
            method: http_method,
            handler: scored.route.handler().clone(),
            pattern: scored.route.display_pattern(),
            parameters,
        })
    }
}
