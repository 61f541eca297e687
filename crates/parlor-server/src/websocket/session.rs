//! Sequential dispatch of inbound frames.
//!
//! One call per text frame, invoked from the connection's reader task, so a
//! single connection's events are always processed in arrival order. The
//! session never replies to the sender directly; every effect a client
//! observes arrives as a room broadcast.
//!
//! Anything that fails validation or authorization is dropped without a
//! response — a misbehaving client costs one discarded frame, never the
//! session.

use parlor_core::events::{ClientEvent, ReactionAction};
use parlor_core::ids::MessageId;
use parlor_core::message::StoredMessage;
use tracing::debug;

use crate::rooms::RoomRegistry;
use crate::websocket::broadcast;

/// Handle one inbound text frame from `username`'s connection in `room`.
pub(crate) async fn dispatch(registry: &RoomRegistry, room: &str, username: &str, text: &str) {
    let event = match ClientEvent::parse(text) {
        Ok(event) => event,
        Err(err) => {
            metrics::counter!(crate::metrics::EVENTS_DISCARDED_TOTAL).increment(1);
            debug!(room, user = username, error = %err, "discarding invalid frame");
            return;
        }
    };

    match event {
        ClientEvent::Message { content } => {
            let failed = registry
                .post_message(room, StoredMessage::new(username, content))
                .await;
            broadcast::prune_failed(registry, room, failed).await;
        }
        ClientEvent::AddReaction { message_id, emoji } => {
            react(registry, room, username, &message_id, &emoji, ReactionAction::Add).await;
        }
        ClientEvent::RemoveReaction { message_id, emoji } => {
            react(
                registry,
                room,
                username,
                &message_id,
                &emoji,
                ReactionAction::Remove,
            )
            .await;
        }
        ClientEvent::Reaction {
            message_id,
            emoji,
            action,
        } => {
            react(registry, room, username, &message_id, &emoji, action).await;
        }
    }
}

/// Authorize and apply one reaction mutation.
///
/// The sender must still be present in the room; a reaction arriving after
/// the connection was pruned (or forged for another room) is discarded.
async fn react(
    registry: &RoomRegistry,
    room: &str,
    username: &str,
    message_id: &MessageId,
    emoji: &str,
    action: ReactionAction,
) {
    if !registry.is_user_present(room, username).await {
        metrics::counter!(crate::metrics::EVENTS_DISCARDED_TOTAL).increment(1);
        debug!(room, user = username, "discarding reaction from absent user");
        return;
    }
    let failed = registry
        .apply_reaction(room, username, message_id, emoji, action)
        .await;
    broadcast::prune_failed(registry, room, failed).await;
}
