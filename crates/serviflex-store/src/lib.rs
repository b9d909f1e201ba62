//! # serviflex-store
//!
//! Storage backends for the ServiFlex chat subsystem: an in-memory
//! document store with live watch delivery and an in-memory blob store.
//! Both implement the boundary traits from `serviflex-core` and back
//! the integration test suite; production deployments substitute real
//! database and object-storage implementations behind the same traits.

pub mod blob;
pub mod document;
pub mod memory;

pub use blob::memory::MemoryBlobStore;
pub use memory::store::MemoryDocumentStore;
