//! Shared test helpers for integration tests.

use std::sync::Arc;

use serviflex_chat::chat::directory::ConversationDirectory;
use serviflex_chat::chat::service::{ChatService, MessageAuthor};
use serviflex_chat::presence::PresenceTracker;
use serviflex_chat::typing::TypingIndicator;
use serviflex_core::config::ChatConfig;
use serviflex_core::traits::blob::BlobStore;
use serviflex_core::traits::store::DocumentStore;
use serviflex_core::types::{ParticipantInfo, UserId};
use serviflex_store::{MemoryBlobStore, MemoryDocumentStore};

/// Wired-up chat stack over in-memory stores.
pub struct TestApp {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub config: ChatConfig,
    pub chat: ChatService,
    pub directory: ConversationDirectory,
    pub typing: TypingIndicator,
}

impl TestApp {
    /// Build the stack with default configuration.
    pub fn new() -> Self {
        Self::with_config(ChatConfig::default())
    }

    /// Build the stack with custom configuration.
    pub fn with_config(config: ChatConfig) -> Self {
        init_tracing();
        let store: Arc<dyn DocumentStore> =
            Arc::new(MemoryDocumentStore::new(config.store.channel_buffer_size));
        let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let chat = ChatService::new(store.clone(), blobs.clone(), config.messaging.clone());
        let directory = ConversationDirectory::new(store.clone());
        let typing = TypingIndicator::new(store.clone(), config.typing.clone());
        Self {
            store,
            blobs,
            config,
            chat,
            directory,
            typing,
        }
    }

    /// A presence tracker sharing this app's store, one per simulated
    /// client session.
    pub fn presence_tracker(&self) -> PresenceTracker {
        PresenceTracker::new(self.store.clone(), self.config.presence.clone())
    }
}

/// An author profile for test users.
pub fn author(id: UserId, name: &str) -> MessageAuthor {
    MessageAuthor {
        id,
        name: name.to_string(),
        photo: None,
    }
}

/// A participant info snapshot for test users.
pub fn info(name: &str) -> ParticipantInfo {
    ParticipantInfo {
        display_name: name.to_string(),
        photo_url: None,
    }
}

/// Receive from `rx` until an item satisfies `pred`, or panic after a
/// generous timeout. Watch deliveries may coalesce or repeat, so tests
/// assert on the state reached rather than on delivery counts.
pub async fn recv_until<T>(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<T>,
    mut pred: impl FnMut(&T) -> bool,
) -> T {
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        loop {
            let item = rx.recv().await.expect("subscription channel closed");
            if pred(&item) {
                return item;
            }
        }
    })
    .await
    .expect("expected state was never delivered")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}
