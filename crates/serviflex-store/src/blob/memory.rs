//! In-memory [`BlobStore`].

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::trace;

use serviflex_core::error::AppError;
use serviflex_core::result::AppResult;
use serviflex_core::traits::blob::BlobStore;

/// In-memory blob store. Keys map to `(payload, content_type)` pairs and
/// URLs use the `mem://` scheme, which is enough for tests to assert the
/// full upload and linkage flow.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, (Bytes, String)>,
}

impl MemoryBlobStore {
    /// Create an empty blob store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, payload: Bytes, content_type: &str) -> AppResult<String> {
        trace!(key, size = payload.len(), content_type, "stored blob");
        self.blobs
            .insert(key.to_string(), (payload, content_type.to_string()));
        Ok(format!("mem://{key}"))
    }

    async fn download(&self, key: &str) -> AppResult<Bytes> {
        self.blobs
            .get(key)
            .map(|entry| entry.0.clone())
            .ok_or_else(|| AppError::not_found(format!("blob not found: {key}")))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.blobs.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_download_roundtrip() {
        let blobs = MemoryBlobStore::new();
        let url = blobs
            .upload("voice-messages/c1/a_1.webm", Bytes::from_static(b"audio"), "audio/webm")
            .await
            .unwrap();
        assert_eq!(url, "mem://voice-messages/c1/a_1.webm");
        let payload = blobs.download("voice-messages/c1/a_1.webm").await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"audio"));
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let blobs = MemoryBlobStore::new();
        let err = blobs.download("nope").await.unwrap_err();
        assert_eq!(err.kind, serviflex_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_upload_overwrites() {
        let blobs = MemoryBlobStore::new();
        blobs
            .upload("k", Bytes::from_static(b"one"), "audio/webm")
            .await
            .unwrap();
        blobs
            .upload("k", Bytes::from_static(b"two"), "audio/webm")
            .await
            .unwrap();
        assert_eq!(blobs.download("k").await.unwrap(), Bytes::from_static(b"two"));
        assert!(blobs.exists("k").await.unwrap());
    }
}
