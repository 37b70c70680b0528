//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_handshakes_total` (counter): verification outcomes by outcome, status.
//!   Accepted verifications carry `status="accepted"`.
//! - `gateway_connected_clients` (gauge): clients currently in the registry
//! - `gateway_disconnects_total` (counter): removals by cause
//! - `gateway_identity_collisions_total` (counter): registrations that replaced a record

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::auth::AuthDecision;
use crate::registry::DisconnectCause;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

fn handshake_labels(decision: &AuthDecision) -> (&'static str, String) {
    match decision {
        AuthDecision::Accept => ("accept", "accepted".to_string()),
        AuthDecision::Reject { status, .. } => ("reject", status.as_u16().to_string()),
    }
}

pub fn record_handshake(decision: &AuthDecision) {
    let (outcome, status) = handshake_labels(decision);
    counter!("gateway_handshakes_total", "outcome" => outcome, "status" => status).increment(1);
}

pub fn record_disconnect(cause: &DisconnectCause) {
    counter!("gateway_disconnects_total", "cause" => cause.kind()).increment(1);
}

pub fn record_identity_collision() {
    counter!("gateway_identity_collisions_total").increment(1);
}

/// A registration added a client without displacing another.
pub fn client_connected() {
    gauge!("gateway_connected_clients").increment(1.0);
}

/// A tracked client left the registry.
pub fn client_removed() {
    gauge!("gateway_connected_clients").decrement(1.0);
}

/// Run `f` against a fresh Prometheus recorder and return its rendering.
#[cfg(test)]
pub(crate) fn render_with(f: impl FnOnce()) -> String {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::with_local_recorder(&recorder, f);
    handle.render()
}
