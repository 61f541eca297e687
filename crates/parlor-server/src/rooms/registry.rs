//! Room registry: the single coordinating owner of all room state.
//!
//! Every mutation of a room — membership, message history, reactions — goes
//! through [`RoomRegistry`] under one lock, and the broadcast that announces
//! the mutation is fanned out inside the same critical section. That gives
//! two properties at once: concurrent events on the same room always observe
//! consistent state, and every connection in a room observes broadcasts in
//! the same relative order.
//!
//! Fan-out can discover connections whose transport is gone. The registry
//! never recurses into removing them; each operation returns the failed
//! [`ConnId`]s and [`crate::websocket::broadcast::prune_failed`] drains the
//! worklist.

use std::collections::HashMap;

use parlor_core::events::{ReactionAction, ServerEvent};
use parlor_core::ids::{ConnId, MessageId};
use parlor_core::message::StoredMessage;
use tokio::sync::Mutex;
use tracing::debug;

use crate::rooms::store::MessageHistory;
use crate::websocket::broadcast;
use crate::websocket::connection::ConnHandle;

/// State for one active room.
///
/// A room exists exactly while it has at least one connection; the registry
/// creates it on first join and discards it (history included) when the last
/// connection leaves.
pub(crate) struct RoomEntry {
    /// Connections in join order. Fan-out iterates this order, and the
    /// `online` list on join/leave events follows it too.
    pub(crate) connections: Vec<ConnHandle>,
    /// Username bound to each connection for its whole session.
    usernames: HashMap<ConnId, String>,
    /// The room's message history.
    history: MessageHistory,
}

impl RoomEntry {
    fn new() -> Self {
        Self {
            connections: Vec::new(),
            usernames: HashMap::new(),
            history: MessageHistory::new(),
        }
    }

    /// Online usernames in join order. Two connections sharing a username
    /// produce two list entries; the list mirrors connections, not users.
    fn online(&self) -> Vec<String> {
        self.connections
            .iter()
            .filter_map(|conn| self.usernames.get(conn.id()).cloned())
            .collect()
    }
}

/// Owner of every active room.
///
/// All methods lock the registry internally; callers never see the lock.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, RoomEntry>>,
}

impl RoomRegistry {
    /// Empty registry with no rooms.
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Register a connection under `room`, binding `username` to it, and
    /// broadcast the join event (the joiner included) with the updated
    /// online list.
    ///
    /// Returns connections whose transport was found dead during fan-out.
    pub async fn join(&self, room: &str, username: &str, handle: ConnHandle) -> Vec<ConnId> {
        let mut rooms = self.rooms.lock().await;
        let entry = rooms.entry(room.to_owned()).or_insert_with(|| {
            metrics::gauge!(crate::metrics::ROOMS_ACTIVE).increment(1.0);
            debug!(room, "room created");
            RoomEntry::new()
        });
        let _ = entry
            .usernames
            .insert(handle.id().clone(), username.to_owned());
        entry.connections.push(handle);
        debug!(
            room,
            user = username,
            online = entry.connections.len(),
            "connection joined"
        );
        let event = ServerEvent::Join {
            user: username.to_owned(),
            online: entry.online(),
        };
        broadcast::fan_out(&entry.connections, &event)
    }

    /// Remove a connection from `room`.
    ///
    /// If the connection had a username bound, the remaining members get a
    /// leave event with the updated online list. When the last connection
    /// leaves, the room and its entire message history are discarded and
    /// nothing is broadcast.
    ///
    /// Unknown rooms and already-removed connections are no-ops, so the
    /// session teardown path and the fan-out pruning path may both call this
    /// for the same connection.
    pub async fn leave(&self, room: &str, conn: &ConnId) -> Vec<ConnId> {
        let mut rooms = self.rooms.lock().await;
        let Some(entry) = rooms.get_mut(room) else {
            return Vec::new();
        };
        let Some(idx) = entry.connections.iter().position(|c| c.id() == conn) else {
            return Vec::new();
        };
        let _ = entry.connections.remove(idx);
        let username = entry.usernames.remove(conn);
        if entry.connections.is_empty() {
            let _ = rooms.remove(room);
            metrics::gauge!(crate::metrics::ROOMS_ACTIVE).decrement(1.0);
            debug!(room, "last connection left, room discarded");
            return Vec::new();
        }
        debug!(room, user = username.as_deref(), "connection left");
        match username {
            Some(user) => {
                let event = ServerEvent::Leave {
                    user,
                    online: entry.online(),
                };
                broadcast::fan_out(&entry.connections, &event)
            }
            None => Vec::new(),
        }
    }

    /// Whether any connection in `room` is currently bound to `username`.
    pub async fn is_user_present(&self, room: &str, username: &str) -> bool {
        self.rooms
            .lock()
            .await
            .get(room)
            .is_some_and(|entry| entry.usernames.values().any(|u| u == username))
    }

    /// Store a message in `room` and broadcast it to every member.
    ///
    /// A message for a room that no longer exists is silently dropped: the
    /// sender raced room teardown and there is nobody left to tell.
    pub async fn post_message(&self, room: &str, message: StoredMessage) -> Vec<ConnId> {
        let mut rooms = self.rooms.lock().await;
        let Some(entry) = rooms.get_mut(room) else {
            debug!(room, "dropping message for unknown room");
            return Vec::new();
        };
        let event = ServerEvent::Message {
            user: message.user.clone(),
            content: message.content.clone(),
            message_id: message.id.clone(),
            reactions: message.reactions.clone(),
            timestamp: message.timestamp,
        };
        entry.history.put(message);
        metrics::counter!(crate::metrics::MESSAGES_STORED_TOTAL).increment(1);
        broadcast::fan_out(&entry.connections, &event)
    }

    /// Apply a reaction mutation on behalf of `user` and broadcast the
    /// resulting state.
    ///
    /// An add always broadcasts when the message exists, even when the user
    /// had already reacted — clients get a confirming update. A remove that
    /// changes nothing broadcasts nothing. Unknown rooms and unknown message
    /// ids are silently dropped.
    pub async fn apply_reaction(
        &self,
        room: &str,
        user: &str,
        message_id: &MessageId,
        emoji: &str,
        action: ReactionAction,
    ) -> Vec<ConnId> {
        let mut rooms = self.rooms.lock().await;
        let Some(entry) = rooms.get_mut(room) else {
            debug!(room, "dropping reaction for unknown room");
            return Vec::new();
        };
        let Some(message) = entry.history.get_mut(message_id) else {
            debug!(room, %message_id, "dropping reaction for unknown message");
            return Vec::new();
        };
        let broadcastable = match action {
            ReactionAction::Add => {
                let _ = message.reactions.add(emoji, user);
                true
            }
            ReactionAction::Remove => message.reactions.remove(emoji, user),
        };
        if !broadcastable {
            debug!(room, %message_id, emoji, user, "no-op reaction removal");
            return Vec::new();
        }
        metrics::counter!(crate::metrics::REACTIONS_APPLIED_TOTAL).increment(1);
        let event = ServerEvent::ReactionUpdate {
            user: user.to_owned(),
            message_id: message_id.clone(),
            emoji: emoji.to_owned(),
            users: message.reactions.users_for(emoji),
            reactions: message.reactions.clone(),
        };
        broadcast::fan_out(&entry.connections, &event)
    }

    /// Number of active rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Number of registered connections across all rooms.
    pub async fn connection_count(&self) -> usize {
        self.rooms
            .lock()
            .await
            .values()
            .map(|entry| entry.connections.len())
            .sum()
    }

    /// Number of stored messages in `room` (0 for unknown rooms).
    pub async fn message_count(&self, room: &str) -> usize {
        self.rooms
            .lock()
            .await
            .get(room)
            .map_or(0, |entry| entry.history.len())
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
