//! Typing indicator: per-user typing flags on the conversation document.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::warn;

use serviflex_core::config::typing::TypingConfig;
use serviflex_core::traits::store::DocumentStore;
use serviflex_core::traits::subscription::Subscription;
use serviflex_core::types::{ConversationId, UserId};

use crate::keys::CHATS;

/// Callback receiving the conversation's typing map, keyed by user id.
pub type TypingCallback = Arc<dyn Fn(HashMap<UserId, bool>) + Send + Sync>;

/// Maintains per-user typing flags in the `typing` map of conversation
/// documents.
///
/// [`TypingIndicator::keystroke`] is the debounced entry point a message
/// composer calls on every input event: it raises the flag and arms an
/// idle timer that lowers it again after the configured quiet period.
/// Typing writes are best effort; a failed write is logged and dropped.
#[derive(Debug)]
pub struct TypingIndicator {
    store: Arc<dyn DocumentStore>,
    config: TypingConfig,
    /// One idle timer per (conversation, user); a newer keystroke
    /// replaces and aborts the previous timer.
    idle_timers: DashMap<(ConversationId, UserId), JoinHandle<()>>,
}

impl TypingIndicator {
    /// Create an indicator over the given store.
    pub fn new(store: Arc<dyn DocumentStore>, config: TypingConfig) -> Self {
        Self {
            store,
            config,
            idle_timers: DashMap::new(),
        }
    }

    /// Set the typing flag explicitly, cancelling any pending idle timer.
    pub async fn set_typing(&self, conversation_id: &ConversationId, user_id: UserId, typing: bool) {
        if let Some((_, timer)) = self
            .idle_timers
            .remove(&(conversation_id.clone(), user_id))
        {
            timer.abort();
        }
        write_typing(&self.store, conversation_id, user_id, typing).await;
    }

    /// Record a keystroke: raise the flag and (re)arm the idle timer
    /// that lowers it after the configured quiet period.
    pub async fn keystroke(&self, conversation_id: &ConversationId, user_id: UserId) {
        write_typing(&self.store, conversation_id, user_id, true).await;

        let store = self.store.clone();
        let idle = self.config.idle_timeout();
        let timer_conversation = conversation_id.clone();
        let timer = tokio::spawn(async move {
            time::sleep(idle).await;
            write_typing(&store, &timer_conversation, user_id, false).await;
        });
        if let Some(previous) = self
            .idle_timers
            .insert((conversation_id.clone(), user_id), timer)
        {
            previous.abort();
        }
    }

    /// Lower the typing flag, e.g. when a message is sent or the
    /// composer loses focus.
    pub async fn clear(&self, conversation_id: &ConversationId, user_id: UserId) {
        self.set_typing(conversation_id, user_id, false).await;
    }

    /// Watch the conversation's typing map.
    pub fn subscribe(
        &self,
        conversation_id: &ConversationId,
        callback: TypingCallback,
    ) -> Subscription {
        self.store.watch_document(
            CHATS,
            conversation_id.as_str(),
            Arc::new(move |doc| {
                let typing = doc
                    .and_then(|doc| doc.data.get("typing").cloned())
                    .and_then(decode_typing_map)
                    .unwrap_or_default();
                callback(typing);
            }),
        )
    }
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        for entry in self.idle_timers.iter() {
            entry.value().abort();
        }
    }
}

fn decode_typing_map(value: Value) -> Option<HashMap<UserId, bool>> {
    serde_json::from_value(value).ok()
}

/// Merge-write one typing flag. Failures are logged and swallowed.
async fn write_typing(
    store: &Arc<dyn DocumentStore>,
    conversation_id: &ConversationId,
    user_id: UserId,
    typing: bool,
) {
    let patch = json!({ "typing": { user_id.to_string(): typing } });
    if let Err(error) = store.set_merge(CHATS, conversation_id.as_str(), patch).await {
        warn!(%conversation_id, %user_id, typing, %error, "typing write failed");
    }
}
