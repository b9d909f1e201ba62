//! Typing indicators.

pub mod indicator;

pub use indicator::{TypingCallback, TypingIndicator};
