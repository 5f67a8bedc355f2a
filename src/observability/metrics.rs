//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_calls_total` (counter): calls by action and outcome
//! - `gateway_call_duration_seconds` (histogram): admission to completion
//! - `gateway_queue_depth` (gauge): calls admitted but not yet dequeued
//! - `gateway_channel_failures_total` (counter): failures that drained the queue
//! - `gateway_reconnects_total` (counter): reconnect attempts by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::protocol::Action;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_call(action: Action, outcome: &'static str, admitted_at: Instant) {
    metrics::counter!(
        "gateway_calls_total",
        "action" => action.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("gateway_call_duration_seconds", "action" => action.as_str())
        .record(admitted_at.elapsed().as_secs_f64());
}

pub fn set_queue_depth(depth: usize) {
    metrics::gauge!("gateway_queue_depth").set(depth as f64);
}

pub fn record_channel_failure() {
    metrics::counter!("gateway_channel_failures_total").increment(1);
}

pub fn record_reconnect(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("gateway_reconnects_total", "outcome" => outcome).increment(1);
}
