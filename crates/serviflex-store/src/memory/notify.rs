//! Per-collection change notification.

use dashmap::DashMap;
use tokio::sync::broadcast;

/// Broadcast fan-out of "something in this collection changed" signals.
///
/// Carries no payload: watchers re-read the collection on every signal,
/// which gives at-least-once full-result-set delivery and makes a lagged
/// receiver harmless. Senders are created lazily per collection and kept
/// for the lifetime of the store.
#[derive(Debug)]
pub struct CollectionNotifier {
    channels: DashMap<String, broadcast::Sender<()>>,
    buffer_size: usize,
}

impl CollectionNotifier {
    /// Create a notifier with the given per-collection buffer size.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: DashMap::new(),
            buffer_size,
        }
    }

    /// Subscribe to change signals for one collection.
    pub fn subscribe(&self, collection: &str) -> broadcast::Receiver<()> {
        self.channels
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .subscribe()
    }

    /// Signal that the collection changed. A no-op when nobody listens.
    pub fn publish(&self, collection: &str) {
        if let Some(tx) = self.channels.get(collection) {
            let _ = tx.send(());
        }
    }
}
