//! Per-room message history.
//!
//! Messages are keyed by their server-assigned id and live exactly as long
//! as their room does; when the last connection leaves a room the whole
//! history is dropped with it.

use std::collections::HashMap;

use parlor_core::ids::MessageId;
use parlor_core::message::StoredMessage;
use tracing::error;

/// Message records for one room, keyed by id.
#[derive(Debug, Default)]
pub struct MessageHistory {
    messages: HashMap<MessageId, StoredMessage>,
}

impl MessageHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a message under its id.
    ///
    /// Ids are generated server-side and unique by construction, so a
    /// collision is a logic error. Release builds log it and let the new
    /// record win rather than corrupt the map.
    pub fn put(&mut self, message: StoredMessage) {
        debug_assert!(
            !self.messages.contains_key(&message.id),
            "message id collision: {}",
            message.id
        );
        if let Some(prev) = self.messages.insert(message.id.clone(), message) {
            error!(message_id = %prev.id, "message id collision, earlier record replaced");
        }
    }

    /// Look up a message by id.
    pub fn get(&self, id: &MessageId) -> Option<&StoredMessage> {
        self.messages.get(id)
    }

    /// Mutable lookup, used by reaction application.
    pub fn get_mut(&mut self, id: &MessageId) -> Option<&mut StoredMessage> {
        self.messages.get_mut(id)
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get() {
        let mut history = MessageHistory::new();
        let msg = StoredMessage::new("alice", "hi");
        let id = msg.id.clone();
        history.put(msg);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(&id).unwrap().content, "hi");
    }

    #[test]
    fn get_unknown_id_is_none() {
        let history = MessageHistory::new();
        assert!(history.get(&MessageId::from("msg_missing")).is_none());
    }

    #[test]
    fn get_mut_allows_reaction_edits() {
        let mut history = MessageHistory::new();
        let msg = StoredMessage::new("alice", "hi");
        let id = msg.id.clone();
        history.put(msg);
        assert!(history.get_mut(&id).unwrap().reactions.add("👍", "bob"));
        assert_eq!(history.get(&id).unwrap().reactions.users_for("👍"), vec!["bob"]);
    }

    #[test]
    #[should_panic(expected = "message id collision")]
    fn duplicate_id_panics_in_debug() {
        let mut history = MessageHistory::new();
        let msg = StoredMessage::new("alice", "hi");
        let dup = msg.clone();
        history.put(msg);
        history.put(dup);
    }
}
