//! Metrics collection and exposition.
//!
//! # Metrics
//! - `upstream_requests_total` (counter): calls by dependency and outcome
//! - `upstream_request_duration_seconds` (histogram): latency per dependency
//! - `upstream_retries_total` (counter): retries and stream restarts by dependency
//! - `broadcast_published_total` (counter): items published to the live stream
//! - `broadcast_subscribers` (gauge): currently attached stream subscribers
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::upstream::UpstreamError;

/// Install the Prometheus exporter on `addr`. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_upstream_call<T>(dependency: &str, outcome: &Result<T, UpstreamError>, start: Instant) {
    let label = match outcome {
        Ok(_) => "success",
        Err(error) => error.kind(),
    };
    counter!(
        "upstream_requests_total",
        "dependency" => dependency.to_string(),
        "outcome" => label
    )
    .increment(1);
    histogram!(
        "upstream_request_duration_seconds",
        "dependency" => dependency.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(dependency: &str) {
    counter!("upstream_retries_total", "dependency" => dependency.to_string()).increment(1);
}

pub fn record_publish() {
    counter!("broadcast_published_total").increment(1);
}

pub fn record_subscribers(count: usize) {
    gauge!("broadcast_subscribers").set(count as f64);
}
