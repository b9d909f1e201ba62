//! Observing presence: live views with staleness filtering.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use serviflex_core::result::AppResult;
use serviflex_core::traits::store::{Document, DocumentStore};
use serviflex_core::traits::subscription::Subscription;
use serviflex_core::types::{PresenceRecord, PresenceView, UserId};

use crate::keys::PRESENCE;
use crate::presence::tracker::PresenceTracker;

/// Callback receiving one user's presence view.
pub type PresenceCallback = Arc<dyn Fn(PresenceView) + Send + Sync>;

/// Callback receiving the merged presence views of a watched set.
pub type PresenceMapCallback = Arc<dyn Fn(HashMap<UserId, PresenceView>) + Send + Sync>;

impl PresenceTracker {
    /// Watch one user's presence. The callback receives the staleness
    /// filtered view immediately and after every change to the record.
    /// An absent or undecodable record is reported as offline.
    pub fn subscribe_to_user(&self, user_id: UserId, callback: PresenceCallback) -> Subscription {
        let store = self.store().clone();
        let threshold = self.config().stale_threshold();
        self.store().watch_document(
            PRESENCE,
            &user_id.to_string(),
            Arc::new(move |doc| {
                callback(decode_view(user_id, doc, &store, threshold));
            }),
        )
    }

    /// Watch several users at once. The callback receives the merged
    /// map, first synchronously with every user offline, then as each
    /// per-user subscription delivers.
    pub fn subscribe_to_many(
        &self,
        user_ids: &[UserId],
        callback: PresenceMapCallback,
    ) -> Subscription {
        let views: HashMap<UserId, PresenceView> = user_ids
            .iter()
            .map(|id| (*id, PresenceView::offline(*id)))
            .collect();
        callback(views.clone());

        let merged = Arc::new(Mutex::new(views));
        let subscriptions = user_ids
            .iter()
            .map(|user_id| {
                let merged = merged.clone();
                let callback = callback.clone();
                self.subscribe_to_user(
                    *user_id,
                    Arc::new(move |view| {
                        let snapshot = {
                            let mut views = match merged.lock() {
                                Ok(views) => views,
                                // A poisoned lock means another callback
                                // panicked; stop delivering.
                                Err(_) => return,
                            };
                            views.insert(view.user_id, view);
                            views.clone()
                        };
                        callback(snapshot);
                    }),
                )
            })
            .collect();
        Subscription::group(subscriptions)
    }

    /// One-shot online check against the configured staleness threshold.
    pub async fn is_user_online(&self, user_id: UserId) -> AppResult<bool> {
        let doc = self.store().get(PRESENCE, &user_id.to_string()).await?;
        let view = decode_view(user_id, doc, self.store(), self.config().stale_threshold());
        Ok(view.online)
    }

    /// Current presence view for one user.
    pub async fn user_presence(&self, user_id: UserId) -> AppResult<PresenceView> {
        let doc = self.store().get(PRESENCE, &user_id.to_string()).await?;
        Ok(decode_view(
            user_id,
            doc,
            self.store(),
            self.config().stale_threshold(),
        ))
    }
}

fn decode_view(
    user_id: UserId,
    doc: Option<Document>,
    store: &Arc<dyn DocumentStore>,
    threshold: chrono::Duration,
) -> PresenceView {
    match doc {
        Some(doc) => match PresenceRecord::from_document(doc.data) {
            Ok(record) => record.view_at(store.server_time(), threshold),
            Err(error) => {
                warn!(%user_id, %error, "undecodable presence record");
                PresenceView::offline(user_id)
            }
        },
        None => PresenceView::offline(user_id),
    }
}
