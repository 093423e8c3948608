//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tunnel_requests_total` (counter): requests by outcome and status
//! - `tunnel_request_duration_seconds` (histogram): handler latency by outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus
//! recorder.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record the outcome of one tunnel request.
pub fn record_request(outcome: &'static str, status: u16, start_time: Instant) {
    ::metrics::counter!(
        "tunnel_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("tunnel_request_duration_seconds", "outcome" => outcome)
        .record(start_time.elapsed().as_secs_f64());
}
