//! Conversations and messages.

pub mod directory;
pub mod service;

pub use directory::{ConversationDirectory, ConversationListCallback};
pub use service::{ChatService, MessageAuthor, MessageListCallback};
