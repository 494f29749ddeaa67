//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): HTTP requests by status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_exchanges_total` (counter): analyzer exchanges by outcome
//! - `gateway_exchange_duration_seconds` (histogram): slot wait plus exchange
//! - `gateway_gate_waiting` (gauge): callers queued for the admission slot
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished HTTP request.
pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("gateway_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one exchange outcome (`ok` or an error kind).
pub fn record_exchange(outcome: &'static str, start: Instant) {
    metrics::counter!("gateway_exchanges_total", "outcome" => outcome).increment(1);
    metrics::histogram!("gateway_exchange_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Publish the admission queue depth.
pub fn record_gate_waiting(waiting: usize) {
    metrics::gauge!("gateway_gate_waiting").set(waiting as f64);
}
