//! Serialize-once fan-out and dead-connection pruning.
//!
//! An event destined for a room is serialized exactly once; every member's
//! queue receives a clone of the same [`Arc<String>`]. Delivery is
//! best-effort and never blocks: a full queue costs that connection that
//! one event, while a closed queue marks the connection dead. Dead
//! connections are removed through the normal leave path, and because each
//! leave is itself a broadcast, pruning runs as a worklist until no new
//! failures appear. Every step removes a connection, so the cascade is
//! bounded.

use std::sync::Arc;

use parlor_core::events::ServerEvent;
use parlor_core::ids::ConnId;
use tracing::{error, warn};

use crate::rooms::RoomRegistry;
use crate::websocket::connection::{ConnHandle, SendOutcome};

/// Serialize an event to its wire payload.
///
/// Serialization of an outbound event can only fail on a bug in the event
/// types; the failure is logged and the broadcast skipped rather than
/// taking the room down.
pub(crate) fn encode(event: &ServerEvent) -> Option<Arc<String>> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Arc::new(json)),
        Err(err) => {
            error!(error = %err, "failed to serialize outbound event");
            None
        }
    }
}

/// Push one event to every connection, in membership order.
///
/// Must be called while the registry lock is held so that all members
/// observe broadcasts in the same relative order. Returns the connections
/// whose queue was closed; the caller is responsible for pruning them via
/// [`prune_failed`] after releasing the lock.
pub(crate) fn fan_out(connections: &[ConnHandle], event: &ServerEvent) -> Vec<ConnId> {
    let Some(payload) = encode(event) else {
        return Vec::new();
    };
    metrics::counter!(crate::metrics::BROADCAST_EVENTS_TOTAL).increment(1);
    let mut failed = Vec::new();
    for conn in connections {
        match conn.send(Arc::clone(&payload)) {
            SendOutcome::Sent => {}
            SendOutcome::QueueFull => {
                metrics::counter!(crate::metrics::BROADCAST_DROPS_TOTAL).increment(1);
                warn!(conn = %conn.id(), "send queue full, dropping event for connection");
            }
            SendOutcome::Closed => failed.push(conn.id().clone()),
        }
    }
    failed
}

/// Remove connections whose delivery failed, emitting their leave events.
///
/// A leave broadcast may itself surface more dead connections; those are
/// appended to the worklist and drained in turn.
pub(crate) async fn prune_failed(registry: &RoomRegistry, room: &str, mut failed: Vec<ConnId>) {
    while let Some(conn) = failed.pop() {
        metrics::counter!(crate::metrics::BROADCAST_FAILURES_TOTAL).increment(1);
        warn!(room, conn = %conn, "pruning connection after failed delivery");
        failed.extend(registry.leave(room, &conn).await);
    }
}
