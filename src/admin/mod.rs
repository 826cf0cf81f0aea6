pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::cache::RouteCache;
use crate::routing::Router as ApiRouter;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub cache: Arc<RouteCache>,
    pub router: Arc<ApiRouter>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .route("/admin/routes/rebuild", post(post_rebuild))
        .route("/admin/routes/resolve", get(get_resolve))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
