//! Domain types for the chat subsystem.

pub mod conversation;
pub mod id;
pub mod message;
pub mod presence;

pub use conversation::{Conversation, ParticipantInfo};
pub use id::{ConversationId, UserId};
pub use message::{Message, MessageKind};
pub use presence::{PresenceRecord, PresenceView};
