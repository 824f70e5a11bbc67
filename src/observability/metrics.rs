//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_dispatch_total` (counter): events by kind (request, upgrade) and target
//! - `gateway_active_connections` (gauge): current connection count
//! - `gateway_worker_fetch_total` (counter): worker script fetches by outcome
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(error) => tracing::error!(address = %addr, %error, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(event: &'static str, target: &'static str) {
    metrics::counter!("gateway_dispatch_total", "event" => event, "target" => target).increment(1);
}

pub fn connection_opened() {
    metrics::gauge!("gateway_active_connections").increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!("gateway_active_connections").decrement(1.0);
}

pub fn record_worker_fetch(outcome: &'static str) {
    metrics::counter!("gateway_worker_fetch_total", "outcome" => outcome).increment(1);
}
