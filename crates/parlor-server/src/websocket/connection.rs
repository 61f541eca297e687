//! Per-connection lifecycle.
//!
//! Each accepted WebSocket gets a bounded outbound queue and two tasks: a
//! writer that drains the queue onto the socket, and a reader that feeds
//! inbound frames through [`session::dispatch`] one at a time. When either
//! side ends, the connection is unregistered from its room.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use parlor_core::ids::ConnId;
use tokio::sync::mpsc;
use tracing::info;

use crate::server::AppState;
use crate::websocket::{broadcast, session};

/// Outcome of queueing one event on a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SendOutcome {
    /// Event queued for delivery.
    Sent,
    /// Queue full; the event is dropped but the connection stays.
    QueueFull,
    /// Receiver gone; the connection is dead and must be pruned.
    Closed,
}

/// Handle to one registered connection's outbound queue.
///
/// This is what the room registry holds per member. Events are queued as
/// pre-serialized [`Arc<String>`] payloads so a broadcast serializes once no
/// matter how many members a room has.
#[derive(Clone, Debug)]
pub struct ConnHandle {
    id: ConnId,
    tx: mpsc::Sender<Arc<String>>,
}

impl ConnHandle {
    /// Wrap an outbound queue sender under a connection id.
    pub fn new(id: ConnId, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self { id, tx }
    }

    /// The connection's id.
    pub fn id(&self) -> &ConnId {
        &self.id
    }

    /// Queue a payload without blocking.
    pub(crate) fn send(&self, payload: Arc<String>) -> SendOutcome {
        match self.tx.try_send(payload) {
            Ok(()) => SendOutcome::Sent,
            Err(mpsc::error::TrySendError::Full(_)) => SendOutcome::QueueFull,
            Err(mpsc::error::TrySendError::Closed(_)) => SendOutcome::Closed,
        }
    }
}

/// Drive one WebSocket connection from accept to teardown.
pub(crate) async fn handle_socket(
    socket: WebSocket,
    room: String,
    username: String,
    state: AppState,
) {
    let conn_id = ConnId::generate();
    metrics::counter!(crate::metrics::WS_CONNECTIONS_TOTAL).increment(1);
    metrics::gauge!(crate::metrics::WS_CONNECTIONS_ACTIVE).increment(1.0);
    info!(conn = %conn_id, room, user = username, "websocket connected");

    let (tx, mut rx) = mpsc::channel::<Arc<String>>(state.config.send_queue_capacity);
    let failed = state
        .registry
        .join(&room, &username, ConnHandle::new(conn_id.clone(), tx))
        .await;
    broadcast::prune_failed(&state.registry, &room, failed).await;

    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            let frame = Message::Text(payload.as_str().to_owned().into());
            if ws_tx.send(frame).await.is_err() {
                break;
            }
        }
    });

    let reader_state = state.clone();
    let reader_room = room.clone();
    let reader_user = username.clone();
    let mut reader = tokio::spawn(async move {
        // Inbound frames are handled strictly in arrival order; the next
        // frame is not read until this one's dispatch completes.
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Text(text) => {
                    session::dispatch(
                        &reader_state.registry,
                        &reader_room,
                        &reader_user,
                        text.as_str(),
                    )
                    .await;
                }
                Message::Close(_) => break,
                // Ping/pong are answered by axum; binary frames are ignored.
                _ => {}
            }
        }
    });

    // Whichever task finishes first, the session is over.
    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    metrics::gauge!(crate::metrics::WS_CONNECTIONS_ACTIVE).decrement(1.0);
    metrics::counter!(crate::metrics::WS_DISCONNECTIONS_TOTAL).increment(1);
    info!(conn = %conn_id, room, user = username, "websocket disconnected");

    let failed = state.registry.leave(&room, &conn_id).await;
    broadcast::prune_failed(&state.registry, &room, failed).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_queues_payload() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnHandle::new(ConnId::generate(), tx);
        assert_eq!(handle.send(Arc::new("{}".to_owned())), SendOutcome::Sent);
        assert_eq!(*rx.try_recv().unwrap(), "{}");
    }

    #[test]
    fn send_reports_full_queue() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnHandle::new(ConnId::generate(), tx);
        assert_eq!(handle.send(Arc::new("a".to_owned())), SendOutcome::Sent);
        assert_eq!(handle.send(Arc::new("b".to_owned())), SendOutcome::QueueFull);
    }

    #[test]
    fn send_reports_closed_receiver() {
        let (tx, rx) = mpsc::channel(1);
        let handle = ConnHandle::new(ConnId::generate(), tx);
        drop(rx);
        assert_eq!(handle.send(Arc::new("a".to_owned())), SendOutcome::Closed);
    }
}
