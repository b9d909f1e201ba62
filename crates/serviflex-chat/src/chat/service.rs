//! Conversation lifecycle and message sending.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;
use tracing::{debug, warn};

use serviflex_core::config::messaging::MessagingConfig;
use serviflex_core::error::AppError;
use serviflex_core::result::AppResult;
use serviflex_core::traits::blob::BlobStore;
use serviflex_core::traits::store::DocumentStore;
use serviflex_core::traits::subscription::Subscription;
use serviflex_core::types::{Conversation, ConversationId, Message, ParticipantInfo, UserId};

use crate::keys::{CHATS, attachment_key, messages_collection, voice_note_key};
use crate::presence::ensure_records;

/// Fixed preview text for voice messages.
const VOICE_PLACEHOLDER: &str = "🎤 Mensagem de voz";
/// Fixed preview text for image messages.
const IMAGE_PLACEHOLDER: &str = "📷 Imagem";
/// Fixed preview text for file messages.
const FILE_PLACEHOLDER: &str = "📎 Arquivo";

/// Sender identity attached to every message at send time.
#[derive(Debug, Clone)]
pub struct MessageAuthor {
    /// Sender user id.
    pub id: UserId,
    /// Display name at send time.
    pub name: String,
    /// Photo URL at send time.
    pub photo: Option<String>,
}

/// Callback receiving a conversation's messages in display order.
pub type MessageListCallback = Arc<dyn Fn(Vec<Message>) + Send + Sync>;

/// Conversation lifecycle and message sending.
///
/// Message appends are the source of truth; the denormalized preview
/// fields on the conversation document (`lastMessage`, `lastMessageAt`,
/// `unreadCount`) are a cache written strictly after the append, so a
/// failure between the two leaves a sent message with a stale preview
/// rather than a phantom preview with no message.
#[derive(Debug)]
pub struct ChatService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    config: MessagingConfig,
}

impl ChatService {
    /// Create a service over the given stores.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        config: MessagingConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            config,
        }
    }

    /// Fetch the conversation between two users, creating it if absent.
    ///
    /// Creation is keyed by the deterministic conversation id, so two
    /// participants racing here converge on one document and the loser's
    /// payload is discarded. On creation both users also get offline
    /// presence records seeded.
    pub async fn get_or_create(
        &self,
        a: UserId,
        a_info: ParticipantInfo,
        b: UserId,
        b_info: ParticipantInfo,
    ) -> AppResult<Conversation> {
        let id = ConversationId::between(a, b)?;
        let now = self.store.server_time();
        let initial = json!({
            "participants": [a, b],
            "participantsInfo": {
                a.to_string(): a_info,
                b.to_string(): b_info,
            },
            "lastMessage": "",
            "lastMessageAt": now,
            "createdAt": now,
            "typing": { a.to_string(): false, b.to_string(): false },
            "archived": { a.to_string(): false, b.to_string(): false },
            "pinned": { a.to_string(): false, b.to_string(): false },
            "muted": { a.to_string(): false, b.to_string(): false },
            "deleted": { a.to_string(): false, b.to_string(): false },
            "unreadCount": { a.to_string(): 0, b.to_string(): 0 },
            "lastReadAt": {},
        });
        let created = self
            .store
            .create_if_absent(CHATS, id.as_str(), initial)
            .await?;
        if created {
            debug!(conversation_id = %id, "conversation created");
            ensure_records(&self.store, &[a, b]).await;
        }
        self.conversation(&id).await
    }

    /// Fetch one conversation by id.
    pub async fn conversation(&self, id: &ConversationId) -> AppResult<Conversation> {
        let doc = self
            .store
            .get(CHATS, id.as_str())
            .await?
            .ok_or_else(|| AppError::not_found(format!("conversation not found: {id}")))?;
        Conversation::from_document(&doc.id, doc.data)
    }

    /// Send a text message. Leading and trailing whitespace is trimmed;
    /// a message that is empty after trimming is rejected. Returns the
    /// new message id.
    pub async fn send_message(
        &self,
        conversation_id: &ConversationId,
        author: &MessageAuthor,
        text: &str,
    ) -> AppResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("message text must not be empty"));
        }
        self.append(
            conversation_id,
            author,
            json!({ "text": text, "type": "text" }),
            text,
        )
        .await
    }

    /// Upload a voice note and send it as a voice message. Returns the
    /// blob URL of the uploaded note.
    pub async fn send_voice_message(
        &self,
        conversation_id: &ConversationId,
        author: &MessageAuthor,
        payload: Bytes,
        duration_seconds: u32,
    ) -> AppResult<String> {
        let key = voice_note_key(conversation_id, author.id, self.store.server_time());
        let voice_url = self.blobs.upload(&key, payload, "audio/webm").await?;
        self.append(
            conversation_id,
            author,
            json!({
                "text": VOICE_PLACEHOLDER,
                "type": "voice",
                "voiceUrl": voice_url,
                "voiceDuration": duration_seconds,
            }),
            VOICE_PLACEHOLDER,
        )
        .await?;
        Ok(voice_url)
    }

    /// Upload an image and send it as an image message. Returns the
    /// blob URL of the uploaded image.
    pub async fn send_image_message(
        &self,
        conversation_id: &ConversationId,
        author: &MessageAuthor,
        payload: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> AppResult<String> {
        self.send_attachment(
            conversation_id,
            author,
            payload,
            file_name,
            content_type,
            "image",
            IMAGE_PLACEHOLDER,
        )
        .await
    }

    /// Upload a file and send it as a file message. Returns the blob
    /// URL of the uploaded file.
    pub async fn send_file_message(
        &self,
        conversation_id: &ConversationId,
        author: &MessageAuthor,
        payload: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> AppResult<String> {
        self.send_attachment(
            conversation_id,
            author,
            payload,
            file_name,
            content_type,
            "file",
            FILE_PLACEHOLDER,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn send_attachment(
        &self,
        conversation_id: &ConversationId,
        author: &MessageAuthor,
        payload: Bytes,
        file_name: &str,
        content_type: &str,
        kind: &str,
        placeholder: &str,
    ) -> AppResult<String> {
        let key = attachment_key(
            conversation_id,
            author.id,
            self.store.server_time(),
            file_name,
        );
        let file_size = payload.len() as u64;
        let file_url = self.blobs.upload(&key, payload, content_type).await?;
        self.append(
            conversation_id,
            author,
            json!({
                "text": placeholder,
                "type": kind,
                "fileUrl": file_url,
                "fileName": file_name,
                "fileSize": file_size,
            }),
            placeholder,
        )
        .await?;
        Ok(file_url)
    }

    /// Append one message, then refresh the conversation preview cache.
    async fn append(
        &self,
        conversation_id: &ConversationId,
        author: &MessageAuthor,
        mut body: serde_json::Value,
        preview: &str,
    ) -> AppResult<String> {
        // Lower the sender's typing flag before the message lands, so
        // the peer never sees "typing" outlive the message itself. Best
        // effort: a failure here must not block the send.
        let typing_patch = json!({ "typing": { author.id.to_string(): false } });
        if let Err(error) = self
            .store
            .set_merge(CHATS, conversation_id.as_str(), typing_patch)
            .await
        {
            warn!(%conversation_id, %error, "typing clear before send failed");
        }

        let now = self.store.server_time();
        if let Some(fields) = body.as_object_mut() {
            fields.insert("senderId".into(), json!(author.id));
            fields.insert("senderName".into(), json!(author.name));
            if let Some(photo) = &author.photo {
                fields.insert("senderPhoto".into(), json!(photo));
            }
            fields.insert("createdAt".into(), json!(now));
            fields.insert("read".into(), json!(false));
        }
        let message_id = self
            .store
            .add(&messages_collection(conversation_id), body)
            .await?;

        // The append already succeeded; a cache failure only stales the
        // directory preview, so log and keep the message.
        if let Err(error) = self.refresh_preview(conversation_id, author.id, preview, now).await {
            warn!(%conversation_id, %error, "conversation preview update failed");
        }
        Ok(message_id)
    }

    async fn refresh_preview(
        &self,
        conversation_id: &ConversationId,
        sender_id: UserId,
        preview: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<()> {
        let truncated: String = preview.chars().take(self.config.preview_max_chars).collect();
        let mut patch = json!({
            "lastMessage": truncated,
            "lastMessageAt": now,
        });
        // Bump the recipient's unread count. Read-modify-write is fine
        // here: a lost increment self-heals on the next send and resets
        // on read.
        let conversation = self.conversation(conversation_id).await?;
        if let Some(peer) = conversation.peer_of(sender_id) {
            if let Some(fields) = patch.as_object_mut() {
                fields.insert(
                    "unreadCount".into(),
                    json!({ peer.to_string(): conversation.unread_for(peer) + 1 }),
                );
            }
        }
        self.store
            .set_merge(CHATS, conversation_id.as_str(), patch)
            .await
    }

    /// Watch a conversation's messages.
    ///
    /// Every delivery carries the full message list re-sorted by
    /// `created_at`. The sort is stable, so messages sharing a timestamp
    /// keep their store (append) order. Undecodable documents are logged
    /// and skipped rather than poisoning the whole list.
    pub fn subscribe_to_messages(
        &self,
        conversation_id: &ConversationId,
        callback: MessageListCallback,
    ) -> Subscription {
        let watched = conversation_id.clone();
        self.store.watch_collection(
            &messages_collection(conversation_id),
            Arc::new(move |docs| {
                let mut messages: Vec<Message> = docs
                    .into_iter()
                    .filter_map(|doc| match Message::from_document(&doc.id, doc.data) {
                        Ok(message) => Some(message),
                        Err(error) => {
                            warn!(conversation_id = %watched, message_id = %doc.id, %error,
                                "skipping undecodable message");
                            None
                        }
                    })
                    .collect();
                messages.sort_by_key(|m| m.created_at);
                callback(messages);
            }),
        )
    }

    /// Current messages of a conversation in display order.
    pub async fn messages(&self, conversation_id: &ConversationId) -> AppResult<Vec<Message>> {
        let docs = self.store.list(&messages_collection(conversation_id)).await?;
        let mut messages = Vec::with_capacity(docs.len());
        for doc in docs {
            messages.push(Message::from_document(&doc.id, doc.data)?);
        }
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    /// Mark the conversation read for `user_id`: reset their unread
    /// count, stamp `lastReadAt`, and flag the peer's messages as read.
    ///
    /// Read receipts are best effort. Failures are logged and swallowed
    /// so a flaky receipt write never breaks the read path calling this.
    pub async fn mark_as_read(&self, conversation_id: &ConversationId, user_id: UserId) {
        let patch = json!({
            "unreadCount": { user_id.to_string(): 0 },
            "lastReadAt": { user_id.to_string(): self.store.server_time() },
        });
        if let Err(error) = self
            .store
            .set_merge(CHATS, conversation_id.as_str(), patch)
            .await
        {
            warn!(%conversation_id, %user_id, %error, "mark-as-read failed");
            return;
        }
        if let Err(error) = self.flag_peer_messages_read(conversation_id, user_id).await {
            warn!(%conversation_id, %user_id, %error, "read-flag sweep failed");
        }
    }

    async fn flag_peer_messages_read(
        &self,
        conversation_id: &ConversationId,
        reader: UserId,
    ) -> AppResult<()> {
        let collection = messages_collection(conversation_id);
        for doc in self.store.list(&collection).await? {
            let message = match Message::from_document(&doc.id, doc.data) {
                Ok(message) => message,
                Err(_) => continue,
            };
            if message.sender_id != reader && !message.read {
                self.store
                    .set_merge(&collection, &message.id, json!({ "read": true }))
                    .await?;
            }
        }
        Ok(())
    }

    /// Set the archived flag for one user.
    pub async fn set_archived(
        &self,
        conversation_id: &ConversationId,
        user_id: UserId,
        archived: bool,
    ) -> AppResult<()> {
        self.set_user_flag(conversation_id, "archived", user_id, archived)
            .await
    }

    /// Set the pinned flag for one user.
    pub async fn set_pinned(
        &self,
        conversation_id: &ConversationId,
        user_id: UserId,
        pinned: bool,
    ) -> AppResult<()> {
        self.set_user_flag(conversation_id, "pinned", user_id, pinned)
            .await
    }

    /// Set the muted flag for one user.
    pub async fn set_muted(
        &self,
        conversation_id: &ConversationId,
        user_id: UserId,
        muted: bool,
    ) -> AppResult<()> {
        self.set_user_flag(conversation_id, "muted", user_id, muted)
            .await
    }

    /// Soft-delete the conversation for one user. The document and its
    /// messages stay; the user's archived and deleted flags are raised.
    pub async fn delete_conversation(
        &self,
        conversation_id: &ConversationId,
        user_id: UserId,
    ) -> AppResult<()> {
        let patch = json!({
            "archived": { user_id.to_string(): true },
            "deleted": { user_id.to_string(): true },
        });
        self.store
            .set_merge(CHATS, conversation_id.as_str(), patch)
            .await
    }

    async fn set_user_flag(
        &self,
        conversation_id: &ConversationId,
        field: &str,
        user_id: UserId,
        value: bool,
    ) -> AppResult<()> {
        let patch = json!({ field: { user_id.to_string(): value } });
        self.store
            .set_merge(CHATS, conversation_id.as_str(), patch)
            .await
    }
}
