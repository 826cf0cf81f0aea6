//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (resolutions, latency, table size, rebuilds)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `router_requests_total` (counter): resolutions by method, outcome
//! - `router_resolve_duration_seconds` (histogram): time spent routing
//! - `router_table_routes` (gauge): routes in the published table
//! - `router_rebuilds_total` (counter): rebuilds by persisted flag
//! - `router_rejected_declarations_total` (counter): skipped declarations
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Method label is normalized so arbitrary client methods cannot
//!   blow up label cardinality

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::routing::definition::HttpMethod;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

fn method_label(method: &str) -> &'static str {
    method
        .parse::<HttpMethod>()
        .map(|m| m.as_str())
        .unwrap_or("OTHER")
}

/// Record one call to the router.
pub fn record_resolution(method: &str, outcome: &'static str, start: Instant) {
    let method = method_label(method);
    counter!("router_requests_total", "method" => method, "outcome" => outcome).increment(1);
    histogram!("router_resolve_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_table_size(routes: usize) {
    gauge!("router_table_routes").set(routes as f64);
}

pub fn record_rebuild(persisted: bool) {
    let persisted = if persisted { "true" } else { "false" };
    counter!("router_rebuilds_total", "persisted" => persisted).increment(1);
}

pub fn record_rejected_declaration() {
    counter!("router_rejected_declarations_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label() {
        assert_eq!(method_label("get"), "GET");
        assert_eq!(method_label("PROPFIND"), "OTHER");
    }
}
