//! In-memory document store.

pub mod notify;
pub mod store;

pub use store::MemoryDocumentStore;
