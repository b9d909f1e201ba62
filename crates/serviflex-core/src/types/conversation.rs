//! Conversation entity.
//!
//! A conversation document is shared mutable state between exactly two
//! participants. Every map keyed by participant id (`typing`, `archived`,
//! `pinned`, `muted`, `deleted`, `unread_count`, `last_read_at`) is
//! per-user view state and must only ever be written with field-level
//! merge patches so the two participants never clobber each other.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::AppResult;
use crate::types::id::{ConversationId, UserId};

/// Denormalized identity snapshot for one participant, captured at
/// conversation creation time and not kept in sync with profile edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    /// Display name at creation time.
    pub display_name: String,
    /// Profile photo URL at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// A 1:1 conversation between two participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Deterministic conversation key; the document id, not stored inline.
    #[serde(skip)]
    pub id: ConversationId,
    /// Exactly two distinct participants. Ordering is for display only.
    pub participants: Vec<UserId>,
    /// Identity snapshots captured at creation time.
    pub participants_info: HashMap<UserId, ParticipantInfo>,
    /// Denormalized preview of the most recent message.
    pub last_message: String,
    /// Timestamp of the most recent message.
    pub last_message_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Ephemeral per-user typing flags.
    #[serde(default)]
    pub typing: HashMap<UserId, bool>,
    /// Per-user archived flags.
    #[serde(default)]
    pub archived: HashMap<UserId, bool>,
    /// Per-user pinned flags.
    #[serde(default)]
    pub pinned: HashMap<UserId, bool>,
    /// Per-user muted flags.
    #[serde(default)]
    pub muted: HashMap<UserId, bool>,
    /// Per-user soft-delete flags; a delete never removes the document.
    #[serde(default)]
    pub deleted: HashMap<UserId, bool>,
    /// Per-user unread message counts.
    #[serde(default)]
    pub unread_count: HashMap<UserId, u32>,
    /// Per-user last-read timestamps.
    #[serde(default)]
    pub last_read_at: HashMap<UserId, DateTime<Utc>>,
}

impl Conversation {
    /// Decode a conversation from a stored document.
    pub fn from_document(id: &str, data: Value) -> AppResult<Self> {
        let mut conversation: Conversation = serde_json::from_value(data)?;
        conversation.id = ConversationId::from_string(id.to_string());
        Ok(conversation)
    }

    /// The other participant, if `user_id` is one of the two.
    pub fn peer_of(&self, user_id: UserId) -> Option<UserId> {
        if !self.participants.contains(&user_id) {
            return None;
        }
        self.participants.iter().copied().find(|p| *p != user_id)
    }

    /// Whether this user has pinned the conversation.
    pub fn is_pinned_by(&self, user_id: UserId) -> bool {
        self.pinned.get(&user_id).copied().unwrap_or(false)
    }

    /// Whether this user has archived the conversation.
    pub fn is_archived_by(&self, user_id: UserId) -> bool {
        self.archived.get(&user_id).copied().unwrap_or(false)
    }

    /// Whether this user has soft-deleted the conversation.
    pub fn is_deleted_by(&self, user_id: UserId) -> bool {
        self.deleted.get(&user_id).copied().unwrap_or(false)
    }

    /// The unread count for this user.
    pub fn unread_for(&self, user_id: UserId) -> u32 {
        self.unread_count.get(&user_id).copied().unwrap_or(0)
    }
}
