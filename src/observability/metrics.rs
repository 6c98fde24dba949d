//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_login_attempts_total` (counter): login attempts by `outcome`
//! - `http_gate_decisions_total` (counter): access checks by `decision`
//! - `http_csrf_rejections_total` (counter): refused submissions by `reason`
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_login(accepted: bool) {
    let outcome = if accepted { "authenticated" } else { "rejected" };
    counter!("http_login_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_gate_decision(allowed: bool) {
    let decision = if allowed { "allow" } else { "redirect" };
    counter!("http_gate_decisions_total", "decision" => decision).increment(1);
}

pub fn record_csrf_rejection(reason: &'static str) {
    counter!("http_csrf_rejections_total", "reason" => reason).increment(1);
}
