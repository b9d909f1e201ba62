//! Blob storage backends.

pub mod memory;

pub use memory::MemoryBlobStore;
