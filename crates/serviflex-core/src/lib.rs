//! # serviflex-core
//!
//! Core crate for the ServiFlex chat subsystem. Contains configuration
//! schemas, typed identifiers, domain entity types, the document-store and
//! blob-store boundary traits, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ServiFlex crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
