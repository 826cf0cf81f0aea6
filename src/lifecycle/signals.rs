//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//! - Trigger appropriate actions (shutdown, route table rebuild)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers a route table rebuild, not shutdown
//! - The rebuild runs on the blocking pool; a second SIGHUP during a
//!   rebuild simply waits for the first to finish

use std::sync::Arc;

use crate::cache::RouteCache;
use crate::lifecycle::shutdown::Shutdown;

/// Watch OS signals until a shutdown signal arrives.
pub async fn watch_signals(shutdown: Shutdown, cache: Arc<RouteCache>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut terminate, mut hangup) =
            match (signal(SignalKind::terminate()), signal(SignalKind::hangup())) {
                (Ok(terminate), Ok(hangup)) => (terminate, hangup),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::error!(error = %e, "Failed to install signal handlers; only Ctrl+C is handled");
                    wait_for_ctrl_c().await;
                    shutdown.trigger();
                    return;
                }
            };

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("SIGINT received, shutting down");
                    break;
                }
                _ = terminate.recv() => {
                    tracing::info!("SIGTERM received, shutting down");
                    break;
                }
                _ = hangup.recv() => {
                    tracing::info!("SIGHUP received, rebuilding route table");
                    let cache = cache.clone();
                    if let Err(e) = tokio::task::spawn_blocking(move || cache.rebuild()).await {
                        tracing::error!(error = %e, "Route table rebuild task failed");
                    }
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = cache;
        wait_for_ctrl_c().await;
    }

    shutdown.trigger();
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
