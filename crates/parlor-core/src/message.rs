//! The stored message record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MessageId;
use crate::reactions::ReactionSet;

/// A message posted to a room, kept for the lifetime of the room.
///
/// Created only from a validated content-message event. Never edited or
/// deleted; the only mutation after creation is through its [`ReactionSet`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Server-generated id, assigned at creation.
    pub id: MessageId,
    /// Author username (the connection's bound username at post time).
    pub user: String,
    /// Message text.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Reactions attached so far.
    pub reactions: ReactionSet,
}

impl StoredMessage {
    /// Create a fresh message with a generated id, the current time, and no
    /// reactions.
    pub fn new(user: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            user: user.into(),
            content: content.into(),
            timestamp: Utc::now(),
            reactions: ReactionSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_has_fresh_id_and_no_reactions() {
        let a = StoredMessage::new("alice", "hi");
        let b = StoredMessage::new("alice", "hi");
        assert_ne!(a.id, b.id);
        assert!(a.reactions.is_empty());
        assert_eq!(a.user, "alice");
        assert_eq!(a.content, "hi");
    }

    #[test]
    fn timestamp_is_recent() {
        let msg = StoredMessage::new("alice", "hi");
        let age = Utc::now().signed_duration_since(msg.timestamp);
        assert!(age.num_seconds() < 2);
    }
}
