//! Binary blob storage abstraction.

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Backing blob storage for voice notes and file attachments.
#[async_trait]
pub trait BlobStore: Send + Sync + Debug + 'static {
    /// Upload a blob under `key` and return a durable URL for it.
    /// Uploading to an existing key overwrites it.
    async fn upload(&self, key: &str, payload: Bytes, content_type: &str) -> AppResult<String>;

    /// Download the blob stored under `key`.
    async fn download(&self, key: &str) -> AppResult<Bytes>;

    /// Whether a blob exists under `key`.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}
