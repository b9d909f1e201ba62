//! Document store abstraction.
//!
//! Collections are flat namespaces of JSON documents addressed by string
//! id. Nested collections are expressed as path-shaped collection names
//! (`chats/{id}/messages`). Writes are field-level merges; watch
//! registrations deliver the current state immediately and the full
//! result set again after every relevant change (at-least-once, no
//! deltas), always from a single task per subscription so callbacks for
//! one subscription never run concurrently.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::result::AppResult;
use crate::traits::subscription::Subscription;

/// A stored document: its id within the collection plus its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id, unique within its collection.
    pub id: String,
    /// JSON body.
    pub data: Value,
}

impl Document {
    /// Convenience constructor.
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Callback for single-document watches. Receives `None` when the
/// document does not (yet) exist.
pub type DocumentCallback = Arc<dyn Fn(Option<Document>) + Send + Sync>;

/// Callback for collection watches. Receives the full matching result
/// set on every delivery.
pub type QueryCallback = Arc<dyn Fn(Vec<Document>) + Send + Sync>;

/// Backing document database.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug + 'static {
    /// Fetch one document, or `None` if absent.
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;

    /// Merge `data` into the document, creating it if absent. Top-level
    /// and nested object fields are merged field by field; non-object
    /// values replace.
    async fn set_merge(&self, collection: &str, id: &str, data: Value) -> AppResult<()>;

    /// Create the document with `data` only if it does not exist yet.
    /// Returns `true` if this call created it.
    async fn create_if_absent(&self, collection: &str, id: &str, data: Value) -> AppResult<bool>;

    /// Append a document with a store-assigned, time-ordered id.
    /// Returns the new id.
    async fn add(&self, collection: &str, data: Value) -> AppResult<String>;

    /// All documents in a collection, ordered by id.
    async fn list(&self, collection: &str) -> AppResult<Vec<Document>>;

    /// The store's notion of the current time. All stored timestamps
    /// come from here, never from client clocks.
    fn server_time(&self) -> DateTime<Utc>;

    /// Watch one document. Delivers the current state immediately, then
    /// again after every write to the collection.
    fn watch_document(&self, collection: &str, id: &str, callback: DocumentCallback)
    -> Subscription;

    /// Watch all documents in a collection.
    fn watch_collection(&self, collection: &str, callback: QueryCallback) -> Subscription;

    /// Watch the documents whose array field `field` contains `value`.
    fn watch_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: Value,
        callback: QueryCallback,
    ) -> Subscription;
}
