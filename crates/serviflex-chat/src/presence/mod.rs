//! Presence: heartbeat publishing and staleness-filtered observation.

pub mod tracker;
pub mod watch;

pub use tracker::{PresenceTracker, ensure_records};
pub use watch::{PresenceCallback, PresenceMapCallback};
