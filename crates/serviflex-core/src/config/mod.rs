//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default so that an absent
//! configuration file still yields a working configuration.

pub mod logging;
pub mod messaging;
pub mod presence;
pub mod store;
pub mod typing;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::messaging::MessagingConfig;
use self::presence::PresenceConfig;
use self::store::StoreConfig;
use self::typing::TypingConfig;

use crate::error::AppError;

/// Root configuration for the chat subsystem.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Presence heartbeat and staleness settings.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Typing indicator settings.
    #[serde(default)]
    pub typing: TypingConfig,
    /// Message channel settings.
    #[serde(default)]
    pub messaging: MessagingConfig,
    /// Document store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ChatConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SERVIFLEX__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SERVIFLEX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
