//! Collection names and blob key layout.

use chrono::{DateTime, Utc};

use serviflex_core::types::{ConversationId, UserId};

/// Top-level conversations collection.
pub const CHATS: &str = "chats";

/// Top-level presence collection, one document per user id.
pub const PRESENCE: &str = "presence";

/// The message subcollection of one conversation.
pub fn messages_collection(conversation_id: &ConversationId) -> String {
    format!("chats/{conversation_id}/messages")
}

/// Blob key for a voice note.
pub fn voice_note_key(
    conversation_id: &ConversationId,
    sender_id: UserId,
    at: DateTime<Utc>,
) -> String {
    format!(
        "voice-messages/{conversation_id}/{sender_id}_{}.webm",
        at.timestamp_millis()
    )
}

/// Blob key for a file or image attachment.
pub fn attachment_key(
    conversation_id: &ConversationId,
    sender_id: UserId,
    at: DateTime<Utc>,
    file_name: &str,
) -> String {
    format!(
        "chat-files/{conversation_id}/{sender_id}_{}_{file_name}",
        at.timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_collection_path() {
        let a = UserId::new();
        let b = UserId::new();
        let id = ConversationId::between(a, b).expect("distinct");
        assert_eq!(
            messages_collection(&id),
            format!("chats/{}/messages", id.as_str())
        );
    }

    #[test]
    fn test_voice_note_key_layout() {
        let a = UserId::new();
        let b = UserId::new();
        let id = ConversationId::between(a, b).expect("distinct");
        let at = Utc::now();
        let key = voice_note_key(&id, a, at);
        assert!(key.starts_with(&format!("voice-messages/{}/{a}_", id.as_str())));
        assert!(key.ends_with(".webm"));
    }
}
