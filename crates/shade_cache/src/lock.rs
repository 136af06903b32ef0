//! Exclusive cross-process lock on the cache directory.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::CacheError;

/// Name of the lock file within the cache directory.
pub const LOCK_FILE: &str = "cache.lock";

/// An exclusive advisory lock held on `<cache_dir>/cache.lock`.
///
/// Serializes read-merge-write sequences of concurrent build processes
/// sharing one cache directory. Released when dropped.
#[derive(Debug)]
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Blocks until the exclusive lock for `cache_dir` is acquired.
    pub fn acquire(cache_dir: &Path) -> Result<Self, CacheError> {
        let path = cache_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| CacheError::Lock {
                path: path.clone(),
                source: e,
            })?;
        FileExt::lock_exclusive(&file).map_err(|e| CacheError::Lock {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("acquired cache lock {}", path.display());
        Ok(Self { file, path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
