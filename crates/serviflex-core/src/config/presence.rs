//! Presence tracker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Presence heartbeat and staleness configuration.
///
/// The staleness threshold must stay larger than the heartbeat interval so
/// a single missed beat does not flap a user offline; the default 3x ratio
/// detects a crashed client within a few heartbeat periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Interval between heartbeat writes, in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Maximum age of a heartbeat before a reader treats the user as
    /// offline, in seconds.
    #[serde(default = "default_stale_threshold")]
    pub stale_threshold_seconds: u64,
}

impl PresenceConfig {
    /// The heartbeat interval as a `Duration`.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds)
    }

    /// The staleness threshold as a `chrono::Duration` for timestamp math.
    pub fn stale_threshold(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.stale_threshold_seconds as i64)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            stale_threshold_seconds: default_stale_threshold(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    20
}

fn default_stale_threshold() -> u64 {
    60
}
