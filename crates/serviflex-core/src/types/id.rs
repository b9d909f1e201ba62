//! Typed identifiers for the chat subsystem.
//!
//! `UserId` is a newtype over [`uuid::Uuid`]; `ConversationId` is the
//! deterministic string key shared by both participants of a conversation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an identifier from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Return the inner UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Deterministic key for a 1:1 conversation.
///
/// Derived from the two participant identifiers by sorting their string
/// forms lexicographically and joining with `_`, so both participants
/// always compute the same key: `between(a, b) == between(b, a)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Derive the conversation key shared by two distinct participants.
    ///
    /// Identical participant ids are a precondition violation and are
    /// rejected rather than silently producing a self-conversation.
    pub fn between(a: UserId, b: UserId) -> AppResult<Self> {
        if a == b {
            return Err(AppError::validation(
                "a conversation requires two distinct participants",
            ));
        }
        let (mut first, mut second) = (a.to_string(), b.to_string());
        if second < first {
            std::mem::swap(&mut first, &mut second);
        }
        Ok(Self(format!("{first}_{second}")))
    }

    /// Wrap a key read back from the store.
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
