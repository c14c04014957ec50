//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_lookups_total` (counter): lookups by outcome
//! - `router_requests_total` (counter): dispatched requests by method, status, route
//! - `router_dispatch_duration_seconds` (histogram): time from accept to response
//! - `router_context_pool_allocations_total` (counter): contexts allocated fresh
//! - `router_context_pool_idle` (gauge): contexts waiting for reuse
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so library users pay nothing
//! - The Prometheus exporter is only installed by the server binary

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_lookup(outcome: &'static str) {
    counter!("router_lookups_total", "outcome" => outcome).increment(1);
}

/// Record a finished request. `route` is the route label or "none".
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();

    counter!(
        "router_requests_total",
        "method" => method.clone(),
        "status" => status.clone(),
        "route" => route.to_string()
    )
    .increment(1);

    histogram!(
        "router_dispatch_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_pool_allocation() {
    counter!("router_context_pool_allocations_total").increment(1);
}

pub fn record_pool_idle(idle: usize) {
    gauge!("router_context_pool_idle").set(idle as f64);
}
