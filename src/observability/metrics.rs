//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (dispatch outcomes, latency, injections)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `router_dispatch_total` (counter): dispatches by method and outcome
//! - `router_dispatch_duration_seconds` (histogram): dispatch latency by method
//! - `router_dependency_injections_total` (counter): constructed dependencies by type
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so library users and tests pay nothing
//! - Outcome labels are a small closed set

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::http::Method;

pub const DISPATCH_TOTAL: &str = "router_dispatch_total";
pub const DISPATCH_DURATION: &str = "router_dispatch_duration_seconds";
pub const INJECTIONS_TOTAL: &str = "router_dependency_injections_total";

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    metrics::describe_counter!(DISPATCH_TOTAL, "Requests dispatched by the router");
    metrics::describe_histogram!(
        DISPATCH_DURATION,
        metrics::Unit::Seconds,
        "Time spent in Router::handle"
    );
    metrics::describe_counter!(INJECTIONS_TOTAL, "Constructor dependencies built by the resolver");
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished dispatch.
pub fn record_dispatch(method: Method, outcome: &'static str, elapsed: Duration) {
    metrics::counter!(DISPATCH_TOTAL, "method" => method.as_str(), "outcome" => outcome).increment(1);
    metrics::histogram!(DISPATCH_DURATION, "method" => method.as_str()).record(elapsed.as_secs_f64());
}

/// Record one injected constructor dependency.
pub fn record_injection(type_name: &str) {
    metrics::counter!(INJECTIONS_TOTAL, "type" => type_name.to_string()).increment(1);
}
