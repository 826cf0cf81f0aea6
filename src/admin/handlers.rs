use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::cache::RebuildReport;
use crate::http::response::error_response;
use crate::routing::definition::RouteDefinition;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub routes: usize,
    pub buckets: usize,
    pub built_at: Option<u64>,
}

#[derive(Serialize)]
pub struct RouteView {
    pub pattern: String,
    pub handler_class: String,
    pub handler_method: String,
    pub parameter_names: Vec<String>,
    pub source: String,
    pub ordinal: usize,
}

impl From<&RouteDefinition> for RouteView {
    fn from(route: &RouteDefinition) -> Self {
        Self {
            pattern: route.display_pattern(),
            handler_class: route.handler().class.clone(),
            handler_method: route.handler().method.clone(),
            parameter_names: route.parameter_names().to_vec(),
            source: route.source().to_string(),
            ordinal: route.ordinal(),
        }
    }
}

#[derive(Serialize)]
pub struct BucketView {
    pub method: &'static str,
    pub length: usize,
    pub routes: Vec<RouteView>,
}

#[derive(Serialize)]
pub struct RejectionView {
    pub source: String,
    pub declaration: String,
    pub error: String,
}

#[derive(Serialize)]
pub struct RebuildSummary {
    pub routes: usize,
    pub buckets: usize,
    pub sources: usize,
    pub shadowed: usize,
    pub persisted: bool,
    pub elapsed_ms: u64,
    pub rejected: Vec<RejectionView>,
}

impl From<RebuildReport> for RebuildSummary {
    fn from(report: RebuildReport) -> Self {
        Self {
            routes: report.routes,
            buckets: report.buckets,
            sources: report.discovery.sources,
            shadowed: report.discovery.shadowed,
            persisted: report.persisted,
            elapsed_ms: report.elapsed.as_millis() as u64,
            rejected: report
                .discovery
                .rejected
                .into_iter()
                .map(|r| RejectionView {
                    source: r.source,
                    declaration: r.declaration.to_string(),
                    error: r.error.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub method: String,
    pub path: String,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let table = state.cache.current();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if table.is_some() { "operational" } else { "warming" },
        routes: table.as_ref().map(|t| t.len()).unwrap_or(0),
        buckets: table.as_ref().map(|t| t.bucket_count()).unwrap_or(0),
        built_at: table.as_ref().map(|t| t.built_at()),
    })
}

pub async fn get_routes(State(state): State<AdminState>) -> Json<Vec<BucketView>> {
    let Some(table) = state.cache.current() else {
        return Json(Vec::new());
    };

    let buckets = table
        .buckets()
        .into_iter()
        .map(|(key, routes)| BucketView {
            method: key.method.as_str(),
            length: key.length,
            routes: routes.iter().map(RouteView::from).collect(),
        })
        .collect();
    Json(buckets)
}

pub async fn post_rebuild(State(state): State<AdminState>) -> Response {
    tracing::info!("Route table rebuild requested via admin API");
    let cache = state.cache.clone();

    match tokio::task::spawn_blocking(move || cache.rebuild()).await {
        Ok(report) => Json(RebuildSummary::from(report)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Route table rebuild task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Rebuild failed")
        }
    }
}

pub async fn get_resolve(
    State(state): State<AdminState>,
    Query(query): Query<ResolveQuery>,
) -> Response {
    match state.router.route(&query.method, &query.path) {
        Ok(resolved) => Json(resolved).into_response(),
        Err(e) => e.into_response(),
    }
}
