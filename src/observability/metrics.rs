//! Metrics collection and exposition.
//!
//! # Metrics
//! - `failover_cycles_total` (counter): completed cycles by outcome
//! - `failover_acquisitions_total` (counter): successful acquire requests
//! - `failover_ownership_errors_total` (counter): authority errors by kind
//! - `failover_self_healthy` (gauge): 1=healthy, 0=unhealthy
//! - `failover_owns_resource` (gauge): 1=this node holds the resource
//!
//! # Design Decisions
//! - Recording is always on and cheap; without an installed recorder the
//!   macros are no-ops
//! - The Prometheus listener is only started when an address is configured

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_cycle(role: &'static str, outcome: &'static str) {
    metrics::counter!("failover_cycles_total", "role" => role, "outcome" => outcome).increment(1);
}

pub fn record_acquisition(role: &'static str) {
    metrics::counter!("failover_acquisitions_total", "role" => role).increment(1);
}

pub fn record_ownership_error(kind: &'static str) {
    metrics::counter!("failover_ownership_errors_total", "kind" => kind).increment(1);
}

pub fn record_self_health(healthy: bool) {
    metrics::gauge!("failover_self_healthy").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_ownership(owned: bool) {
    metrics::gauge!("failover_owns_resource").set(if owned { 1.0 } else { 0.0 });
}
