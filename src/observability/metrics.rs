//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by handler, status
//! - `gateway_request_duration_seconds` (histogram): latency by handler
//! - `gateway_downloads_total` (counter): assets served by platform, arch
//! - `gateway_stats_events_total` (counter): stats writes by event kind
//!
//! Without an installed recorder every call is a no-op, so handlers record
//! unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(handler: &'static str, status: u16, start_time: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "handler" => handler,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "handler" => handler)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record an asset handed to a client.
pub fn record_download(platform: &'static str, arch: &'static str) {
    metrics::counter!("gateway_downloads_total", "platform" => platform, "arch" => arch)
        .increment(1);
}

/// Record a committed stats write.
pub fn record_stats_event(kind: &'static str) {
    metrics::counter!("gateway_stats_events_total", "kind" => kind).increment(1);
}
