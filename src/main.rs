//! API request router.
//!
//! Resolves `METHOD /api/...` requests to handler identifiers using a cached,
//! bucketed route table.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ routing::Router ──▶ Dispatcher ──▶ Response
//!                     (request id,     │
//!                      timeout,        ▼
//!                      tracing)     cache::RouteCache ◀── RouteDiscoverer ◀── route sources
//!                                      │  (ArcSwap)          (CRUD, controllers, models)
//!                                      ▼
//!                                   CacheStore (memory | file snapshot)
//!
//!     Operator ──▶ admin API / router-cli / SIGHUP ──▶ RouteCache::rebuild()
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use api_router::admin::{setup_admin_router, AdminState};
use api_router::config::{load_config, RouterConfig};
use api_router::http::{DescribeDispatcher, HttpServer};
use api_router::lifecycle::signals::watch_signals;
use api_router::lifecycle::{Application, Shutdown};
use api_router::observability::{logging::init_logging, metrics::init_metrics};

const DEFAULT_CONFIG_PATH: &str = "router.toml";

#[derive(Parser)]
#[command(name = "api-router")]
#[command(about = "Resolve API requests to controller handlers", long_about = None)]
struct Args {
    /// Configuration file. Defaults to ./router.toml when present.
    #[arg(short, long, env = "ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Ignore any persisted route snapshot and rediscover at startup.
    #[arg(long)]
    rebuild_cache: bool,
}

fn resolve_config(args: &Args) -> Result<RouterConfig, Box<dyn std::error::Error>> {
    match &args.config {
        Some(path) => Ok(load_config(path)?),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Ok(load_config(&default)?)
            } else {
                Ok(RouterConfig::default())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "api-router starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_prefix = %config.routing.api_prefix,
        cache_backend = ?config.cache.backend,
        controllers = config.controllers.len(),
        models = config.models.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let app = Arc::new(Application::new(config));

    // Discovery is synchronous; keep it off the runtime threads.
    let warm_app = app.clone();
    let rebuild = args.rebuild_cache;
    if let Some(report) = tokio::task::spawn_blocking(move || warm_app.warm(rebuild)).await? {
        tracing::info!(
            routes = report.routes,
            persisted = report.persisted,
            "Route table rebuilt on request"
        );
    }

    let shutdown = Shutdown::new();

    let listener = TcpListener::bind(&app.config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(
        app.config.clone(),
        app.router.clone(),
        Arc::new(DescribeDispatcher),
    );
    let api_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let admin_task = if app.config.admin.enabled {
        let admin_listener = TcpListener::bind(&app.config.admin.bind_address).await?;
        tracing::info!(address = %admin_listener.local_addr()?, "Admin API listening");

        let admin = setup_admin_router(AdminState {
            cache: app.cache.clone(),
            router: app.router.clone(),
            api_key: Arc::from(app.config.admin.api_key.as_str()),
        });
        let admin_shutdown = shutdown.wait();
        Some(tokio::spawn(async move {
            axum::serve(admin_listener, admin)
                .with_graceful_shutdown(admin_shutdown)
                .await
        }))
    } else {
        None
    };

    tokio::spawn(watch_signals(shutdown.clone(), app.cache.clone()));

    api_task.await??;
    if let Some(task) = admin_task {
        task.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
