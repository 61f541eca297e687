//! Per-message reaction state.
//!
//! A [`ReactionSet`] maps an emoji symbol to the list of usernames who
//! attached it. Mutation is pure data manipulation — no transport, no
//! locking — so the same logic backs both the server and its tests.
//!
//! Two invariants hold at all times:
//!
//! - a username appears at most once per emoji (adds are idempotent);
//! - an emoji key exists only while its user list is non-empty (removing
//!   the last user deletes the key, so serialized output never contains
//!   empty lists).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Emoji → usernames mapping for one message.
///
/// Serializes as the flattened JSON object (`{"👍": ["bob"]}`), which is the
/// exact `reactions` field shape on outbound events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionSet(BTreeMap<String, Vec<String>>);

impl ReactionSet {
    /// Empty reaction set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `user`'s reaction under `emoji`, creating the entry if absent.
    ///
    /// Returns `false` if the user had already reacted with this emoji (the
    /// set is unchanged), `true` if state changed. Callers broadcast on both
    /// outcomes: a duplicate add is harmless and clients get a confirming
    /// update.
    pub fn add(&mut self, emoji: &str, user: &str) -> bool {
        let users = self.0.entry(emoji.to_owned()).or_default();
        if users.iter().any(|u| u == user) {
            return false;
        }
        users.push(user.to_owned());
        true
    }

    /// Detach `user`'s reaction from `emoji`.
    ///
    /// Returns `false` if the emoji key is absent or the user was not in its
    /// list — a no-op remove, which callers must not broadcast. On success
    /// the username is removed and an emptied emoji entry is pruned.
    pub fn remove(&mut self, emoji: &str, user: &str) -> bool {
        let Some(users) = self.0.get_mut(emoji) else {
            return false;
        };
        let Some(idx) = users.iter().position(|u| u == user) else {
            return false;
        };
        let _ = users.remove(idx);
        if users.is_empty() {
            let _ = self.0.remove(emoji);
        }
        true
    }

    /// Current usernames reacting with `emoji`, in the order they reacted.
    /// Empty if the emoji has no entry.
    pub fn users_for(&self, emoji: &str) -> Vec<String> {
        self.0.get(emoji).cloned().unwrap_or_default()
    }

    /// Whether no reactions are attached at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct emoji keys present.
    pub fn emoji_count(&self) -> usize {
        self.0.len()
    }
}
