//! Wire event types.
//!
//! Two event families, both internally tagged JSON with a `type` field:
//!
//! - **[`ClientEvent`]**: events read from a client connection. Parsing via
//!   [`ClientEvent::parse`] is the schema gate — anything that does not
//!   deserialize into one of these shapes is rejected before the relay core
//!   ever sees it.
//! - **[`ServerEvent`]**: events the relay broadcasts to every connection in
//!   a room. Serialized once per broadcast, one JSON text frame per write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MessageId;
use crate::reactions::ReactionSet;

/// Events accepted from a client connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Post a message to the connection's room.
    Message {
        /// Message text.
        content: String,
    },

    /// Attach an emoji reaction to a previously posted message.
    AddReaction {
        /// Target message id.
        message_id: MessageId,
        /// Emoji symbol.
        emoji: String,
    },

    /// Detach an emoji reaction from a previously posted message.
    RemoveReaction {
        /// Target message id.
        message_id: MessageId,
        /// Emoji symbol.
        emoji: String,
    },

    /// Generic reaction event carrying an explicit add/remove action.
    Reaction {
        /// Target message id.
        message_id: MessageId,
        /// Emoji symbol.
        emoji: String,
        /// Whether to add or remove.
        action: ReactionAction,
    },
}

/// The direction of a generic [`ClientEvent::Reaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionAction {
    /// Attach the reaction.
    Add,
    /// Detach the reaction.
    Remove,
}

impl ClientEvent {
    /// Parse one inbound text frame.
    ///
    /// This is the validation gate: an `Err` means the frame is malformed or
    /// schema-invalid and must be silently discarded by the session loop.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Events broadcast to every connection in a room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A connection joined the room.
    Join {
        /// Username of the joiner.
        user: String,
        /// All usernames currently online in the room, duplicates preserved.
        online: Vec<String>,
    },

    /// A connection left the room.
    Leave {
        /// Username of the leaver.
        user: String,
        /// Usernames still online after the departure.
        online: Vec<String>,
    },

    /// A message was posted.
    Message {
        /// Author username.
        user: String,
        /// Message text.
        content: String,
        /// Server-assigned id for later reaction events.
        message_id: MessageId,
        /// Flattened emoji → usernames mapping (empty for a fresh message).
        reactions: ReactionSet,
        /// Creation time, RFC 3339.
        timestamp: DateTime<Utc>,
    },

    /// A message's reaction set changed (or an idempotent add re-confirmed
    /// the existing state).
    ReactionUpdate {
        /// Username of the reacting connection.
        user: String,
        /// Target message id.
        message_id: MessageId,
        /// The emoji the update concerns.
        emoji: String,
        /// Current usernames for that emoji; empty after the last remove.
        users: Vec<String>,
        /// The message's full reaction mapping after the mutation.
        reactions: ReactionSet,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_message_event() {
        let ev = ClientEvent::parse(r#"{"type":"message","content":"hi"}"#).unwrap();
        assert_eq!(
            ev,
            ClientEvent::Message {
                content: "hi".into()
            }
        );
    }

    #[test]
    fn parse_add_reaction_event() {
        let ev =
            ClientEvent::parse(r#"{"type":"add_reaction","message_id":"msg_1","emoji":"👍"}"#)
                .unwrap();
        assert_eq!(
            ev,
            ClientEvent::AddReaction {
                message_id: "msg_1".into(),
                emoji: "👍".into()
            }
        );
    }

    #[test]
    fn parse_generic_reaction_event() {
        let ev = ClientEvent::parse(
            r#"{"type":"reaction","message_id":"msg_1","emoji":"👍","action":"remove"}"#,
        )
        .unwrap();
        assert_eq!(
            ev,
            ClientEvent::Reaction {
                message_id: "msg_1".into(),
                emoji: "👍".into(),
                action: ReactionAction::Remove,
            }
        );
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(ClientEvent::parse("not json").is_err());
    }

    #[test]
    fn parse_rejects_unknown_type() {
        assert!(ClientEvent::parse(r#"{"type":"shrug"}"#).is_err());
    }

    #[test]
    fn parse_rejects_missing_fields() {
        assert!(ClientEvent::parse(r#"{"type":"message"}"#).is_err());
        assert!(ClientEvent::parse(r#"{"type":"add_reaction","emoji":"👍"}"#).is_err());
    }

    #[test]
    fn parse_rejects_unknown_action() {
        let text = r#"{"type":"reaction","message_id":"m","emoji":"👍","action":"toggle"}"#;
        assert!(ClientEvent::parse(text).is_err());
    }

    #[test]
    fn parse_ignores_extra_fields() {
        let ev = ClientEvent::parse(r#"{"type":"message","content":"hi","ts":123}"#).unwrap();
        assert!(matches!(ev, ClientEvent::Message { .. }));
    }

    #[test]
    fn join_event_wire_shape() {
        let ev = ServerEvent::Join {
            user: "alice".into(),
            online: vec!["alice".into()],
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type":"join","user":"alice","online":["alice"]})
        );
    }

    #[test]
    fn message_event_wire_shape() {
        let msg = crate::message::StoredMessage::new("alice", "hi");
        let ev = ServerEvent::Message {
            user: msg.user.clone(),
            content: msg.content.clone(),
            message_id: msg.id.clone(),
            reactions: msg.reactions.clone(),
            timestamp: msg.timestamp,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["content"], "hi");
        assert_eq!(json["reactions"], serde_json::json!({}));
        // RFC 3339 timestamp
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn reaction_update_with_empty_users() {
        let ev = ServerEvent::ReactionUpdate {
            user: "bob".into(),
            message_id: "msg_1".into(),
            emoji: "👍".into(),
            users: vec![],
            reactions: ReactionSet::new(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["users"], serde_json::json!([]));
        assert_eq!(json["reactions"], serde_json::json!({}));
    }
}
