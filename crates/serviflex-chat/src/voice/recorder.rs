//! Voice note recorder state machine.
//!
//! Purely local: accumulates audio chunks between `start` and `stop` and
//! measures the elapsed duration. The finished note is handed to
//! [`crate::ChatService::send_voice_message`] for upload and delivery.

use std::time::Instant;

use bytes::{Bytes, BytesMut};

use serviflex_core::error::AppError;
use serviflex_core::result::AppResult;

/// A finished recording ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceNote {
    /// Concatenated audio payload.
    pub payload: Bytes,
    /// Recording duration, whole seconds, rounded down.
    pub duration_seconds: u32,
}

#[derive(Debug)]
enum RecorderState {
    Idle,
    Recording {
        started_at: Instant,
        chunks: BytesMut,
    },
    Recorded {
        note: VoiceNote,
    },
}

impl RecorderState {
    fn name(&self) -> &'static str {
        match self {
            RecorderState::Idle => "idle",
            RecorderState::Recording { .. } => "recording",
            RecorderState::Recorded { .. } => "recorded",
        }
    }
}

/// Single-session voice recorder: `Idle -> Recording -> Recorded`,
/// with `cancel` and `reset` returning to `Idle` from anywhere.
/// Invalid transitions are rejected, never silently coerced.
#[derive(Debug)]
pub struct VoiceRecorder {
    state: RecorderState,
}

impl VoiceRecorder {
    /// Create an idle recorder.
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
        }
    }

    /// Begin recording. Only valid while idle.
    pub fn start(&mut self) -> AppResult<()> {
        match self.state {
            RecorderState::Idle => {
                self.state = RecorderState::Recording {
                    started_at: Instant::now(),
                    chunks: BytesMut::new(),
                };
                Ok(())
            }
            _ => Err(self.invalid_transition("start")),
        }
    }

    /// Append one chunk of captured audio. Only valid while recording.
    pub fn push_chunk(&mut self, chunk: Bytes) -> AppResult<()> {
        match &mut self.state {
            RecorderState::Recording { chunks, .. } => {
                chunks.extend_from_slice(&chunk);
                Ok(())
            }
            _ => Err(self.invalid_transition("push_chunk")),
        }
    }

    /// Seconds elapsed since `start`, while recording.
    pub fn elapsed_seconds(&self) -> AppResult<u32> {
        match &self.state {
            RecorderState::Recording { started_at, .. } => {
                Ok(started_at.elapsed().as_secs() as u32)
            }
            _ => Err(self.invalid_transition("elapsed_seconds")),
        }
    }

    /// Finish recording and hold the note for [`VoiceRecorder::take`].
    pub fn stop(&mut self) -> AppResult<()> {
        match std::mem::replace(&mut self.state, RecorderState::Idle) {
            RecorderState::Recording { started_at, chunks } => {
                self.state = RecorderState::Recorded {
                    note: VoiceNote {
                        payload: chunks.freeze(),
                        duration_seconds: started_at.elapsed().as_secs() as u32,
                    },
                };
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid_transition("stop"))
            }
        }
    }

    /// Discard an in-progress recording and return to idle.
    pub fn cancel(&mut self) {
        self.state = RecorderState::Idle;
    }

    /// Discard any held note and return to idle.
    pub fn reset(&mut self) {
        self.state = RecorderState::Idle;
    }

    /// Take the finished note, returning the recorder to idle.
    pub fn take(&mut self) -> AppResult<VoiceNote> {
        match std::mem::replace(&mut self.state, RecorderState::Idle) {
            RecorderState::Recorded { note } => Ok(note),
            other => {
                self.state = other;
                Err(self.invalid_transition("take"))
            }
        }
    }

    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording { .. })
    }

    fn invalid_transition(&self, operation: &str) -> AppError {
        AppError::validation(format!(
            "cannot {operation} while recorder is {}",
            self.state.name()
        ))
    }
}

impl Default for VoiceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serviflex_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_full_recording_flow() {
        let mut recorder = VoiceRecorder::new();
        recorder.start().unwrap();
        assert!(recorder.is_recording());
        recorder.push_chunk(Bytes::from_static(b"ab")).unwrap();
        recorder.push_chunk(Bytes::from_static(b"cd")).unwrap();
        recorder.stop().unwrap();
        let note = recorder.take().unwrap();
        assert_eq!(note.payload, Bytes::from_static(b"abcd"));
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_start_while_recording_is_rejected() {
        let mut recorder = VoiceRecorder::new();
        recorder.start().unwrap();
        let err = recorder.start().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        // Still recording; the failed start did not disturb the session.
        assert!(recorder.is_recording());
    }

    #[test]
    fn test_stop_while_idle_is_rejected() {
        let mut recorder = VoiceRecorder::new();
        assert!(recorder.stop().is_err());
    }

    #[test]
    fn test_push_chunk_after_stop_is_rejected() {
        let mut recorder = VoiceRecorder::new();
        recorder.start().unwrap();
        recorder.stop().unwrap();
        assert!(recorder.push_chunk(Bytes::from_static(b"x")).is_err());
    }

    #[test]
    fn test_cancel_discards_recording() {
        let mut recorder = VoiceRecorder::new();
        recorder.start().unwrap();
        recorder.push_chunk(Bytes::from_static(b"x")).unwrap();
        recorder.cancel();
        assert!(recorder.take().is_err());
        // Idle again, so a fresh session may start.
        recorder.start().unwrap();
    }

    #[test]
    fn test_take_twice_is_rejected() {
        let mut recorder = VoiceRecorder::new();
        recorder.start().unwrap();
        recorder.stop().unwrap();
        recorder.take().unwrap();
        assert!(recorder.take().is_err());
    }
}
