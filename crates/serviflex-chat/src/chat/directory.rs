//! The conversation directory: one user's conversation list.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use serviflex_core::result::AppResult;
use serviflex_core::traits::store::DocumentStore;
use serviflex_core::traits::subscription::Subscription;
use serviflex_core::types::{Conversation, UserId};

use crate::keys::CHATS;

/// Callback receiving a user's conversations in display order.
pub type ConversationListCallback = Arc<dyn Fn(Vec<Conversation>) + Send + Sync>;

/// Lists and watches the conversations a user participates in.
///
/// Ordering is applied client side on every delivery: conversations the
/// user pinned come first, then most recent activity first. The sort is
/// stable, so equal keys keep their store order.
#[derive(Debug)]
pub struct ConversationDirectory {
    store: Arc<dyn DocumentStore>,
}

impl ConversationDirectory {
    /// Create a directory over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Watch the user's conversation list.
    pub fn subscribe_to_user_chats(
        &self,
        user_id: UserId,
        callback: ConversationListCallback,
    ) -> Subscription {
        self.store.watch_array_contains(
            CHATS,
            "participants",
            json!(user_id),
            Arc::new(move |docs| {
                let mut conversations: Vec<Conversation> = docs
                    .into_iter()
                    .filter_map(
                        |doc| match Conversation::from_document(&doc.id, doc.data) {
                            Ok(conversation) => Some(conversation),
                            Err(error) => {
                                warn!(conversation_id = %doc.id, %error,
                                    "skipping undecodable conversation");
                                None
                            }
                        },
                    )
                    .collect();
                sort_for_display(&mut conversations, user_id);
                callback(conversations);
            }),
        )
    }

    /// One-shot fetch of the user's conversations in display order.
    pub async fn user_chats(&self, user_id: UserId) -> AppResult<Vec<Conversation>> {
        let mut conversations = Vec::new();
        for doc in self.store.list(CHATS).await? {
            let conversation = Conversation::from_document(&doc.id, doc.data)?;
            if conversation.participants.contains(&user_id) {
                conversations.push(conversation);
            }
        }
        sort_for_display(&mut conversations, user_id);
        Ok(conversations)
    }
}

/// Pinned-by-this-user first, then most recent activity first.
fn sort_for_display(conversations: &mut [Conversation], user_id: UserId) {
    conversations.sort_by_key(|c| {
        (
            !c.is_pinned_by(user_id),
            std::cmp::Reverse(c.last_message_at),
        )
    });
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, Utc};
    use serviflex_core::types::ConversationId;

    use super::*;

    fn conversation(user: UserId, pinned: bool, minutes_ago: i64) -> Conversation {
        let peer = UserId::new();
        let mut pins = HashMap::new();
        pins.insert(user, pinned);
        Conversation {
            id: ConversationId::between(user, peer).expect("distinct"),
            participants: vec![user, peer],
            participants_info: HashMap::new(),
            last_message: String::new(),
            last_message_at: Utc::now() - Duration::minutes(minutes_ago),
            created_at: Utc::now(),
            typing: HashMap::new(),
            archived: HashMap::new(),
            pinned: pins,
            muted: HashMap::new(),
            deleted: HashMap::new(),
            unread_count: HashMap::new(),
            last_read_at: HashMap::new(),
        }
    }

    #[test]
    fn test_pinned_sorts_before_recent() {
        let user = UserId::new();
        let old_pinned = conversation(user, true, 60);
        let fresh = conversation(user, false, 1);
        let mut list = vec![fresh.clone(), old_pinned.clone()];
        sort_for_display(&mut list, user);
        assert_eq!(list[0].id, old_pinned.id);
        assert_eq!(list[1].id, fresh.id);
    }

    #[test]
    fn test_recency_orders_within_unpinned() {
        let user = UserId::new();
        let older = conversation(user, false, 30);
        let newer = conversation(user, false, 5);
        let mut list = vec![older.clone(), newer.clone()];
        sort_for_display(&mut list, user);
        assert_eq!(list[0].id, newer.id);
    }

    #[test]
    fn test_peer_pin_does_not_affect_this_user() {
        let user = UserId::new();
        let mut by_peer = conversation(user, false, 60);
        // Pinned by the peer, not by this user.
        let peer = by_peer.peer_of(user).expect("has peer");
        by_peer.pinned.insert(peer, true);
        let fresh = conversation(user, false, 1);
        let mut list = vec![by_peer.clone(), fresh.clone()];
        sort_for_display(&mut list, user);
        assert_eq!(list[0].id, fresh.id);
    }
}
