//! Typing indicator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Typing indicator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Idle window after the last keystroke before the typing flag is
    /// cleared, in milliseconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_ms: u64,
}

impl TypingConfig {
    /// The idle timeout as a `Duration`.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    3000
}
