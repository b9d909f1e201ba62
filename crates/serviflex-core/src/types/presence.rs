//! Presence records and the derived online/offline view.
//!
//! A stored record claiming `online: true` is only trusted while its
//! `last_seen` is fresh. Sessions that end without an offline write
//! (a crashed client, a dropped connection) go stale and are reported
//! offline once the heartbeat stops refreshing `last_seen`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::AppResult;
use crate::types::id::UserId;

/// The stored presence document for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    /// The user this record describes.
    pub user_id: UserId,
    /// The last state explicitly written by a session.
    pub online: bool,
    /// Last heartbeat (or explicit status change) timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl PresenceRecord {
    /// Decode a presence record from a stored document.
    pub fn from_document(data: Value) -> AppResult<Self> {
        Ok(serde_json::from_value(data)?)
    }

    /// An explicit offline record with no heartbeat history.
    pub fn offline(user_id: UserId) -> Self {
        Self {
            user_id,
            online: false,
            last_seen: None,
        }
    }

    /// Whether this record should be reported as online at `now`.
    ///
    /// Requires both the stored `online` flag and a `last_seen` within
    /// `stale_threshold` of `now`. A record without a `last_seen` is
    /// never online.
    pub fn is_effectively_online(&self, now: DateTime<Utc>, stale_threshold: Duration) -> bool {
        if !self.online {
            return false;
        }
        match self.last_seen {
            Some(last_seen) => now.signed_duration_since(last_seen) <= stale_threshold,
            None => false,
        }
    }

    /// The observable view of this record at `now`.
    pub fn view_at(&self, now: DateTime<Utc>, stale_threshold: Duration) -> PresenceView {
        PresenceView {
            user_id: self.user_id,
            online: self.is_effectively_online(now, stale_threshold),
            last_seen: self.last_seen,
        }
    }
}

/// What observers see: the stored record with staleness already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceView {
    /// The user this view describes.
    pub user_id: UserId,
    /// Effective online state after staleness filtering.
    pub online: bool,
    /// Last heartbeat timestamp, if any session ever reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl PresenceView {
    /// The view for a user with no presence record at all.
    pub fn offline(user_id: UserId) -> Self {
        Self {
            user_id,
            online: false,
            last_seen: None,
        }
    }
}
