//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sweeper_pending_seen_total` (counter): pending hashes received, by endpoint
//! - `sweeper_skipped_total` (counter): hashes left alone, by reason
//! - `sweeper_pipeline_errors_total` (counter): per-hash failures, by stage
//! - `sweeper_replacements_total` (counter): replacements broadcast, by endpoint
//! - `sweeper_pending_dropped_total` (counter): hashes lost to feed lag, by endpoint
//! - `sweeper_active_monitors` (gauge): monitors still subscribed

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_pending_seen(endpoint: &str) {
    counter!("sweeper_pending_seen_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_skipped(reason: &'static str) {
    counter!("sweeper_skipped_total", "reason" => reason).increment(1);
}

pub fn record_pipeline_error(stage: &'static str) {
    counter!("sweeper_pipeline_errors_total", "stage" => stage).increment(1);
}

pub fn record_replacement(endpoint: &str) {
    counter!("sweeper_replacements_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn monitor_started() {
    gauge!("sweeper_active_monitors").increment(1.0);
}

pub fn monitor_stopped() {
    gauge!("sweeper_active_monitors").decrement(1.0);
}

pub fn record_feed_lag(endpoint: &str, missed: u64) {
    counter!("sweeper_pending_dropped_total", "endpoint" => endpoint.to_string()).increment(missed);
}
