//! Incremental compilation cache for shader units.
//!
//! This crate maps a composite [`CacheKey`] (unit name, variant, and the
//! content digests of both stage sources) to the artifacts that build
//! produced. Entries are only trusted while every artifact still exists
//! with the digest recorded when it was written, and the file-backed store
//! rewrites its JSON file atomically under an exclusive lock after every
//! update.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod file_store;
pub mod hasher;
pub mod key;
pub mod lock;
pub mod manifest;
pub mod store;

pub use entry::CacheEntry;
pub use error::CacheError;
pub use file_store::FileCacheStore;
pub use hasher::SourceHasher;
pub use key::CacheKey;
pub use manifest::CacheManifest;
pub use store::{CacheStore, MemoryCacheStore};
