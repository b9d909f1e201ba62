//! Message channel configuration.

use serde::{Deserialize, Serialize};

/// Message channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Maximum number of characters kept in the denormalized
    /// last-message preview on the conversation record.
    #[serde(default = "default_preview_max_chars")]
    pub preview_max_chars: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            preview_max_chars: default_preview_max_chars(),
        }
    }
}

fn default_preview_max_chars() -> usize {
    100
}
