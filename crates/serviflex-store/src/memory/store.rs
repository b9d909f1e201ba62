//! In-memory [`DocumentStore`] with live watch delivery.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tracing::trace;
use uuid::Uuid;

use serviflex_core::result::AppResult;
use serviflex_core::traits::store::{Document, DocumentCallback, DocumentStore, QueryCallback};
use serviflex_core::traits::subscription::Subscription;

use crate::document::merge_patch;
use crate::memory::notify::CollectionNotifier;

/// In-memory document store.
///
/// Collections are `BTreeMap`s keyed by document id, so listing is
/// ordered by id; appended ids are UUIDv7 and therefore time-ordered.
/// Each watch registration runs its own delivery task, so callbacks for
/// one subscription never run concurrently with each other.
#[derive(Debug, Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    collections: DashMap<String, BTreeMap<String, Value>>,
    notifier: CollectionNotifier,
}

impl StoreInner {
    fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(id).map(|data| Document::new(id, data.clone())))
    }

    fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn matching(&self, collection: &str, field: &str, value: &Value) -> Vec<Document> {
        self.documents(collection)
            .into_iter()
            .filter(|doc| match doc.data.get(field) {
                Some(Value::Array(items)) => items.contains(value),
                _ => false,
            })
            .collect()
    }
}

impl MemoryDocumentStore {
    /// Create an empty store with the given notification buffer size.
    pub fn new(channel_buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                collections: DashMap::new(),
                notifier: CollectionNotifier::new(channel_buffer_size),
            }),
        }
    }

    /// Spawn the delivery task behind every watch registration.
    ///
    /// The receiver is subscribed before the initial snapshot is read, so
    /// a write racing with registration is never missed. The task
    /// delivers the snapshot immediately, then re-reads and redelivers on
    /// every change signal. A lagged receiver redelivers the current
    /// state and carries on; at-least-once full-snapshot delivery makes
    /// the dropped signals harmless.
    fn spawn_watcher(
        &self,
        collection: &str,
        deliver: impl Fn(&StoreInner) + Send + 'static,
    ) -> Subscription {
        let mut rx = self.inner.notifier.subscribe(collection);
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            deliver(&inner);
            loop {
                match rx.recv().await {
                    Ok(()) | Err(RecvError::Lagged(_)) => deliver(&inner),
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Subscription::new(move || handle.abort())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        Ok(self.inner.document(collection, id))
    }

    async fn set_merge(&self, collection: &str, id: &str, data: Value) -> AppResult<()> {
        {
            let mut docs = self
                .inner
                .collections
                .entry(collection.to_string())
                .or_default();
            let slot = docs
                .entry(id.to_string())
                .or_insert_with(|| Value::Object(Default::default()));
            merge_patch(slot, data);
        }
        trace!(collection, id, "merged document");
        self.inner.notifier.publish(collection);
        Ok(())
    }

    async fn create_if_absent(&self, collection: &str, id: &str, data: Value) -> AppResult<bool> {
        let created = {
            let mut docs = self
                .inner
                .collections
                .entry(collection.to_string())
                .or_default();
            if docs.contains_key(id) {
                false
            } else {
                docs.insert(id.to_string(), data);
                true
            }
        };
        if created {
            trace!(collection, id, "created document");
            self.inner.notifier.publish(collection);
        }
        Ok(created)
    }

    async fn add(&self, collection: &str, data: Value) -> AppResult<String> {
        // UUIDv7 ids sort by creation time, so id order is append order.
        let id = Uuid::now_v7().to_string();
        {
            let mut docs = self
                .inner
                .collections
                .entry(collection.to_string())
                .or_default();
            docs.insert(id.clone(), data);
        }
        trace!(collection, id, "appended document");
        self.inner.notifier.publish(collection);
        Ok(id)
    }

    async fn list(&self, collection: &str) -> AppResult<Vec<Document>> {
        Ok(self.inner.documents(collection))
    }

    fn server_time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn watch_document(
        &self,
        collection: &str,
        id: &str,
        callback: DocumentCallback,
    ) -> Subscription {
        let collection_name = collection.to_string();
        let id = id.to_string();
        self.spawn_watcher(collection, move |inner| {
            callback(inner.document(&collection_name, &id));
        })
    }

    fn watch_collection(&self, collection: &str, callback: QueryCallback) -> Subscription {
        let collection_name = collection.to_string();
        self.spawn_watcher(collection, move |inner| {
            callback(inner.documents(&collection_name));
        })
    }

    fn watch_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: Value,
        callback: QueryCallback,
    ) -> Subscription {
        let collection_name = collection.to_string();
        let field = field.to_string();
        self.spawn_watcher(collection, move |inner| {
            callback(inner.matching(&collection_name, &field, &value));
        })
    }
}
