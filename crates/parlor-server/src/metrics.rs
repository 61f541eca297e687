//! Prometheus metrics recorder and `/metrics` endpoint handler.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric name constants to avoid typos across modules.

/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Active rooms (gauge).
pub const ROOMS_ACTIVE: &str = "rooms_active";
/// Messages stored total (counter).
pub const MESSAGES_STORED_TOTAL: &str = "messages_stored_total";
/// Reaction mutations applied total (counter).
pub const REACTIONS_APPLIED_TOTAL: &str = "reactions_applied_total";
/// Events broadcast to rooms total (counter).
pub const BROADCAST_EVENTS_TOTAL: &str = "broadcast_events_total";
/// Events dropped because a connection's send queue was full (counter).
pub const BROADCAST_DROPS_TOTAL: &str = "broadcast_drops_total";
/// Delivery failures that led to a connection being pruned (counter).
pub const BROADCAST_FAILURES_TOTAL: &str = "broadcast_failures_total";
/// Inbound events discarded as malformed or unauthorized (counter).
pub const EVENTS_DISCARDED_TOTAL: &str = "events_discarded_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_and_render() {
        // Build a recorder + handle (no global install to avoid test conflicts).
        let handle = PrometheusBuilder::new().build_recorder().handle();

        // Should produce valid (possibly empty) Prometheus text.
        let output = handle.render();
        assert!(output.is_empty() || output.contains('#') || output.contains('\n'));
    }

    #[test]
    fn metric_constants_are_snake_case() {
        let names = [
            WS_CONNECTIONS_TOTAL,
            WS_DISCONNECTIONS_TOTAL,
            WS_CONNECTIONS_ACTIVE,
            ROOMS_ACTIVE,
            MESSAGES_STORED_TOTAL,
            REACTIONS_APPLIED_TOTAL,
            BROADCAST_EVENTS_TOTAL,
            BROADCAST_DROPS_TOTAL,
            BROADCAST_FAILURES_TOTAL,
            EVENTS_DISCARDED_TOTAL,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
