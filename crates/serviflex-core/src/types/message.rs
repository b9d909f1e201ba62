//! Message entity.
//!
//! Messages are append-only: once written they are never mutated except
//! for the `read` flag, and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::AppResult;
use crate::types::id::UserId;

/// The payload kind of a message; determines which optional fields are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text.
    Text,
    /// An image attachment (`file_url`/`file_name`/`file_size`).
    Image,
    /// A generic file attachment (`file_url`/`file_name`/`file_size`).
    File,
    /// A voice note (`voice_url`/`voice_duration`).
    Voice,
}

/// One unit of communication within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Store-assigned document id, used only for list keying; not stored
    /// inline.
    #[serde(skip)]
    pub id: String,
    /// Sender identity snapshot at send time.
    pub sender_id: UserId,
    /// Sender display name at send time.
    pub sender_name: String,
    /// Sender photo URL at send time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_photo: Option<String>,
    /// Primary text payload (or a fixed placeholder for non-text kinds).
    pub text: String,
    /// Payload kind.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Attachment URL for file/image messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Attachment file name for file/image messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Attachment size in bytes for file/image messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Voice note URL for voice messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_url: Option<String>,
    /// Voice note duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_duration: Option<u32>,
    /// Store-assigned creation timestamp; display order within a
    /// conversation is non-decreasing in this field.
    pub created_at: DateTime<Utc>,
    /// Set when the recipient marks the conversation as read.
    #[serde(default)]
    pub read: bool,
}

impl Message {
    /// Decode a message from a stored document.
    pub fn from_document(id: &str, data: Value) -> AppResult<Self> {
        let mut message: Message = serde_json::from_value(data)?;
        message.id = id.to_string();
        Ok(message)
    }
}
