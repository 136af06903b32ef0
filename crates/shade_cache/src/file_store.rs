//! File-backed cache store.
//!
//! The store keeps the whole manifest in memory and rewrites
//! `<cache_dir>/cache.json` on every [`persist`](CacheStore::persist). Each
//! persist re-reads the file under the cache lock and overlays only the
//! entries this process has put, so concurrent builds sharing a cache
//! directory never drop each other's entries.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::lock::CacheLock;
use crate::manifest::{CacheManifest, MANIFEST_FILE};
use crate::store::CacheStore;

/// Cache store persisted as JSON in a cache directory.
pub struct FileCacheStore {
    /// Directory holding the manifest and lock file.
    cache_dir: PathBuf,

    /// In-memory view of the manifest.
    manifest: CacheManifest,

    /// Keys put since the last successful persist.
    dirty: BTreeSet<String>,
}

impl FileCacheStore {
    /// Opens the store in `cache_dir`, creating the directory if needed.
    ///
    /// A missing manifest yields an empty store; a corrupt one is logged as a
    /// warning and also yields an empty store.
    pub fn open(cache_dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        let manifest = CacheManifest::load_or_empty(&cache_dir.join(MANIFEST_FILE));
        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
            manifest,
            dirty: BTreeSet::new(),
        })
    }

    /// Path of the manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.cache_dir.join(MANIFEST_FILE)
    }

    /// Returns a reference to the in-memory manifest.
    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }
}

impl CacheStore for FileCacheStore {
    fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.manifest.entries.get(key)
    }

    fn put(&mut self, key: &CacheKey, entry: CacheEntry) {
        let key = key.to_string();
        self.manifest.entries.insert(key.clone(), entry);
        self.dirty.insert(key);
    }

    fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let key = key.to_string();
        self.dirty.remove(&key);
        self.manifest.entries.remove(&key)
    }

    fn persist(&mut self) -> Result<(), CacheError> {
        let _lock = CacheLock::acquire(&self.cache_dir)?;
        let path = self.manifest_path();

        let mut merged = CacheManifest::load_or_empty(&path);
        for key in &self.dirty {
            if let Some(entry) = self.manifest.entries.get(key) {
                merged.entries.insert(key.clone(), entry.clone());
            }
        }
        merged.write_atomic(&path)?;

        log::debug!(
            "persisted {} cache entries ({} new) to {}",
            merged.entries.len(),
            self.dirty.len(),
            path.display()
        );
        self.manifest = merged;
        self.dirty.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.manifest.entries.len()
    }
}
