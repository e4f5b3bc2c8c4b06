//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_decisions_total` (counter): admin-area decisions by outcome tag
//! - `gate_lockouts_total` (counter): lockouts set or extended
//! - `gate_honeypot_hits_total` (counter): decoy path requests
//! - `gate_credential_check_seconds` (histogram): bcrypt verification latency
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(outcome: &'static str) {
    counter!("gate_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_lockout() {
    counter!("gate_lockouts_total").increment(1);
}

pub fn record_honeypot_hit() {
    counter!("gate_honeypot_hits_total").increment(1);
}

pub fn record_credential_check(start: Instant) {
    histogram!("gate_credential_check_seconds").record(start.elapsed().as_secs_f64());
}
