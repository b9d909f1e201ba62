//! Presence tracker: owns the local user's presence session.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use serviflex_core::config::presence::PresenceConfig;
use serviflex_core::traits::store::DocumentStore;
use serviflex_core::types::UserId;

use crate::keys::PRESENCE;

/// One live presence session: the heartbeat task keeping a user's
/// record fresh.
#[derive(Debug)]
struct ActiveSession {
    user_id: UserId,
    heartbeat: JoinHandle<()>,
}

/// Publishes and maintains presence state for at most one user at a
/// time.
///
/// Starting a session writes the user online immediately and then
/// refreshes `lastSeen` on a fixed heartbeat interval. Presence writes
/// are best effort: a failed write is logged and the session carries on,
/// because observers treat a record whose heartbeat has gone stale as
/// offline anyway.
#[derive(Debug)]
pub struct PresenceTracker {
    store: Arc<dyn DocumentStore>,
    config: PresenceConfig,
    active: Mutex<Option<ActiveSession>>,
}

impl PresenceTracker {
    /// Create a tracker with no active session.
    pub fn new(store: Arc<dyn DocumentStore>, config: PresenceConfig) -> Self {
        Self {
            store,
            config,
            active: Mutex::new(None),
        }
    }

    pub(crate) fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub(crate) fn config(&self) -> &PresenceConfig {
        &self.config
    }

    /// Start (or restart) the presence session for `user_id`.
    ///
    /// Starting for the user already tracked is a no-op beyond an
    /// immediate heartbeat. Starting for a different user first stops
    /// the previous session, so a tracker never runs two heartbeats.
    pub async fn start(&self, user_id: UserId) {
        let mut active = self.active.lock().await;
        if let Some(session) = active.as_ref() {
            if session.user_id == user_id {
                write_presence(&self.store, user_id, true).await;
                return;
            }
        }
        if let Some(previous) = active.take() {
            end_session(&self.store, previous).await;
        }

        write_presence(&self.store, user_id, true).await;

        let store = self.store.clone();
        let interval = self.config.heartbeat_interval();
        let heartbeat = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            // A write still in flight delays the next beat instead of
            // letting ticks stack up behind it.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately and the session already
            // wrote online, so consume it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                write_presence(&store, user_id, true).await;
            }
        });

        debug!(%user_id, "presence session started");
        *active = Some(ActiveSession { user_id, heartbeat });
    }

    /// Stop the active session, if any, and write the user offline.
    pub async fn stop(&self) {
        let session = self.active.lock().await.take();
        if let Some(session) = session {
            end_session(&self.store, session).await;
        }
    }

    /// Refresh `last_seen` for the active session without waiting for
    /// the next heartbeat. A no-op when no session is active.
    pub async fn touch(&self) {
        let user_id = self.active.lock().await.as_ref().map(|s| s.user_id);
        if let Some(user_id) = user_id {
            write_presence(&self.store, user_id, true).await;
        }
    }

    /// The user of the active session, if one is running.
    pub async fn active_user(&self) -> Option<UserId> {
        self.active.lock().await.as_ref().map(|s| s.user_id)
    }
}

impl Drop for PresenceTracker {
    fn drop(&mut self) {
        // Dropping without stop() cannot write offline (no async in
        // drop); the record goes stale and observers flip it offline.
        if let Ok(mut active) = self.active.try_lock() {
            if let Some(session) = active.take() {
                session.heartbeat.abort();
            }
        }
    }
}

async fn end_session(store: &Arc<dyn DocumentStore>, session: ActiveSession) {
    session.heartbeat.abort();
    write_presence(store, session.user_id, false).await;
    debug!(user_id = %session.user_id, "presence session stopped");
}

/// Merge-write one presence record. Failures are logged and swallowed.
async fn write_presence(store: &Arc<dyn DocumentStore>, user_id: UserId, online: bool) {
    let record = json!({
        "userId": user_id,
        "online": online,
        "lastSeen": store.server_time(),
    });
    if let Err(error) = store
        .set_merge(PRESENCE, &user_id.to_string(), record)
        .await
    {
        warn!(%user_id, online, %error, "presence write failed");
    }
}

/// Seed offline presence records for users that have none yet, so
/// observers see an explicit offline rather than an absent document.
/// Existing records are left untouched.
pub async fn ensure_records(store: &Arc<dyn DocumentStore>, user_ids: &[UserId]) {
    for user_id in user_ids {
        let record = json!({
            "userId": user_id,
            "online": false,
        });
        if let Err(error) = store
            .create_if_absent(PRESENCE, &user_id.to_string(), record)
            .await
        {
            warn!(%user_id, %error, "presence seed failed");
        }
    }
}
