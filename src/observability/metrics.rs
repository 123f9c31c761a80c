//! Metrics collection and exposition.
//!
//! # Metrics
//! - `asset_manager_requests_total` (counter): HTTP requests by method, route, status
//! - `asset_manager_request_duration_seconds` (histogram): HTTP latency
//! - `asset_manager_orchestrations_total` (counter): runs by operation, outcome
//! - `asset_manager_orchestration_duration_seconds` (histogram): run latency
//! - `asset_manager_key_leases_total` (counter): lease events (acquired, released)
//! - `asset_manager_key_release_failures_total` (counter): keys left in the daemon
//! - `asset_manager_confirmation_polls_total` (counter): pending status queries
//! - `asset_manager_dependency_health` (gauge): 1=healthy, 0=unhealthy
//! - `asset_manager_registry_assets` (gauge): assets tracked by the registry
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Recording without an installed exporter is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "asset_manager_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "asset_manager_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the end of an orchestration run. `outcome` is `success` or an
/// error kind.
pub fn record_orchestration(operation: &'static str, outcome: &str, start: Instant) {
    counter!(
        "asset_manager_orchestrations_total",
        "operation" => operation,
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!(
        "asset_manager_orchestration_duration_seconds",
        "operation" => operation
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_key_lease(event: &'static str) {
    counter!("asset_manager_key_leases_total", "event" => event).increment(1);
}

pub fn record_release_failure() {
    counter!("asset_manager_key_release_failures_total").increment(1);
}

pub fn record_confirmation_poll(outcome: &'static str) {
    counter!("asset_manager_confirmation_polls_total", "outcome" => outcome).increment(1);
}

/// Record the health of an external dependency (`algod`, `kmd`).
pub fn record_dependency_health(service: &str, healthy: bool) {
    gauge!("asset_manager_dependency_health", "service" => service.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_registry_size(size: usize) {
    gauge!("asset_manager_registry_assets").set(size as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter() {
        let start = Instant::now();
        record_request("POST", "/assets", 201, start);
        record_orchestration("create", "success", start);
        record_key_lease("acquired");
        record_release_failure();
        record_confirmation_poll("pending");
        record_dependency_health("algod", true);
        record_registry_size(3);
    }
}
