//! Metrics collection and exposition.
//!
//! # Metrics
//! - `horus_route_matches_total` (counter): matched declarations by kind (on, group, vhost)
//! - `horus_requests_total` (counter): finished requests by status
//! - `horus_request_duration_seconds` (histogram): time from accept to response

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_route_match(kind: &'static str) {
    metrics::counter!("horus_route_matches_total", "kind" => kind).increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "horus_requests_total",
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "horus_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}
