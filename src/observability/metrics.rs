//! Metrics collection and exposition.
//!
//! # Metrics
//! - `contact_requests_recorded_total` (counter): requests written to the log
//! - `contact_requests_skipped_total` (counter): requests not logged, by reason
//! - `contact_audit_notes_total` (counter): audit notes, by action
//! - `contact_unseen_cleared_total` (counter): records flipped to seen

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::model::AuditAction;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_request_logged(method: &str) {
    counter!("contact_requests_recorded_total", "method" => method.to_string()).increment(1);
}

pub fn record_request_skipped(reason: &'static str) {
    counter!("contact_requests_skipped_total", "reason" => reason).increment(1);
}

pub fn record_audit_note(action: AuditAction) {
    counter!("contact_audit_notes_total", "action" => action.label()).increment(1);
}

pub fn record_unseen_cleared(count: usize) {
    counter!("contact_unseen_cleared_total").increment(count as u64);
}
