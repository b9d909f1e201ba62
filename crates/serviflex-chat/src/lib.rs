//! # serviflex-chat
//!
//! The ServiFlex real-time chat subsystem: presence tracking with
//! heartbeats and staleness filtering, typing indicators, 1:1
//! conversations with live message delivery, the conversation directory,
//! and voice note recording.
//!
//! All components talk to storage through the `serviflex-core` boundary
//! traits and take their backing stores by injection, so several
//! independent sessions can coexist in one process.

pub mod chat;
pub mod keys;
pub mod presence;
pub mod typing;
pub mod voice;

pub use chat::directory::ConversationDirectory;
pub use chat::service::ChatService;
pub use presence::tracker::PresenceTracker;
pub use typing::indicator::TypingIndicator;
pub use voice::recorder::{VoiceNote, VoiceRecorder};
