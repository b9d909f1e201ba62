//! Abstract boundaries to backing infrastructure.
//!
//! Every component in the chat subsystem talks to storage through these
//! traits so the whole stack can run against the in-memory backend in
//! tests and against a real document database in production.

pub mod blob;
pub mod store;
pub mod subscription;

pub use blob::BlobStore;
pub use store::{Document, DocumentCallback, DocumentStore, QueryCallback};
pub use subscription::Subscription;
