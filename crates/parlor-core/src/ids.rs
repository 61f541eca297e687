//! Branded identifiers.
//!
//! Both IDs are newtypes over strings so they cannot be confused with each
//! other or with usernames at API boundaries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque per-session connection handle.
///
/// Issued by the server when a transport session is accepted. Distinct from
/// the username: two connections may share a username, but each holds its
/// own `ConnId` for the whole session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnId(String);

impl ConnId {
    /// Generate a fresh connection id.
    pub fn generate() -> Self {
        Self(format!("conn_{}", Uuid::now_v7()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-generated message identifier, assigned at creation time and
/// immutable thereafter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a fresh message id.
    pub fn generate() -> Self {
        Self(format!("msg_{}", Uuid::now_v7()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
