//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_fallback_candidate_valid` (gauge): 1=valid, 0=invalid
//! - `proxy_fallback_probe_latency_seconds` (histogram): successful probe latency
//! - `proxy_fallback_probe_failures_total` (counter): failed probes
//! - `proxy_fallback_dials_total` (counter): dial attempts by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels: group, candidate, outcome

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_candidate_valid(group: &str, candidate: &str, valid: bool) {
    gauge!(
        "proxy_fallback_candidate_valid",
        "group" => group.to_string(),
        "candidate" => candidate.to_string()
    )
    .set(if valid { 1.0 } else { 0.0 });
}

pub fn record_probe_latency(group: &str, candidate: &str, latency: Duration) {
    histogram!(
        "proxy_fallback_probe_latency_seconds",
        "group" => group.to_string(),
        "candidate" => candidate.to_string()
    )
    .record(latency.as_secs_f64());
}

pub fn record_probe_failure(group: &str, candidate: &str) {
    counter!(
        "proxy_fallback_probe_failures_total",
        "group" => group.to_string(),
        "candidate" => candidate.to_string()
    )
    .increment(1);
}

pub fn record_dial(group: &str, candidate: &str, success: bool) {
    counter!(
        "proxy_fallback_dials_total",
        "group" => group.to_string(),
        "candidate" => candidate.to_string(),
        "outcome" => if success { "success" } else { "failure" }
    )
    .increment(1);
}
