//! The cache store abstraction and its in-memory implementation.

use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::manifest::CacheManifest;

/// A mapping from cache key to cache entry with explicit persistence.
///
/// Implementors provide raw lookup, insertion, and persistence; the
/// artifact check in [`CacheStore::get`] is shared so every store applies
/// the same validity rule.
pub trait CacheStore {
    /// Returns the stored entry for a serialized key without validating it.
    fn entry(&self, key: &str) -> Option<&CacheEntry>;

    /// Inserts or overwrites the entry for `key`.
    fn put(&mut self, key: &CacheKey, entry: CacheEntry);

    /// Removes the entry for `key`, returning it if present.
    ///
    /// Used to take back a `put` whose persist failed, so the entry is
    /// neither served nor written by a later persist.
    fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry>;

    /// Writes the current mapping to durable storage.
    fn persist(&mut self) -> Result<(), CacheError>;

    /// Number of entries currently held.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the entry for `key` only if all of its artifacts still exist
    /// with the digests recorded in the entry.
    ///
    /// An entry whose artifacts are missing or were overwritten by a build of
    /// another key is reported as absent and left in place; the next
    /// successful build of the key overwrites it.
    fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        let serialized = key.to_string();
        let entry = self.entry(&serialized)?;
        if !entry.artifacts_exist() {
            log::debug!("cache entry {serialized} has missing artifacts, treating as miss");
            return None;
        }
        if !entry.artifacts_current() {
            log::debug!("artifacts of cache entry {serialized} have changed, treating as miss");
            return None;
        }
        Some(entry)
    }
}

/// A cache store that lives only in memory.
///
/// Used by tests and by callers that want incremental behavior within one
/// process without touching disk. `persist` only counts calls.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    manifest: CacheManifest,
    persist_count: usize,
}

impl MemoryCacheStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times [`CacheStore::persist`] has been called.
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }

    /// The entries held by this store.
    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }
}

impl CacheStore for MemoryCacheStore {
    fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.manifest.entries.get(key)
    }

    fn put(&mut self, key: &CacheKey, entry: CacheEntry) {
        self.manifest.entries.insert(key.to_string(), entry);
    }

    fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        self.manifest.entries.remove(&key.to_string())
    }

    fn persist(&mut self) -> Result<(), CacheError> {
        self.persist_count += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.manifest.entries.len()
    }
}
