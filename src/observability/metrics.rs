//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by path class and status
//! - `edge_request_duration_seconds` (histogram): latency by path class
//! - `edge_policy_failures_total` (counter): header policies that failed
//! - `edge_auth_events_total` (counter): login/logout/denial outcomes
//! - `edge_revalidations_total` (counter): revalidation requests accepted
//!
//! Recording is a no-op until an exporter is installed, so tests and
//! library users never need to call [`init_metrics`].

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(class: &'static str, status: u16, start: Instant) {
    ::metrics::counter!("edge_requests_total", "class" => class, "status" => status.to_string()).increment(1);
    ::metrics::histogram!("edge_request_duration_seconds", "class" => class)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_policy_failure(policy: &'static str) {
    ::metrics::counter!("edge_policy_failures_total", "policy" => policy).increment(1);
}

pub fn record_auth_event(outcome: &'static str) {
    ::metrics::counter!("edge_auth_events_total", "outcome" => outcome).increment(1);
}

pub fn record_revalidation() {
    ::metrics::counter!("edge_revalidations_total").increment(1);
}
