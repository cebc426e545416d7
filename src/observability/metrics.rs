//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ipmap_lookups_total` (counter): destination resolutions by outcome
//!   (`matched`, `default`, `empty`)
//! - `ipmap_invalid_source_total` (counter): source values that were not addresses
//! - `ipmap_config_reloads_total` (counter): reloads by result (`applied`, `rejected`)
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Low-overhead metric updates (atomic operations)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_lookup(outcome: &'static str) {
    metrics::counter!("ipmap_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_invalid_source() {
    metrics::counter!("ipmap_invalid_source_total").increment(1);
}

pub fn record_reload(result: &'static str) {
    metrics::counter!("ipmap_config_reloads_total", "result" => result).increment(1);
}
