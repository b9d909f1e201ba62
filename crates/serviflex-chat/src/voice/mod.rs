//! Voice note recording.

pub mod recorder;

pub use recorder::{VoiceNote, VoiceRecorder};
