//! The persisted cache manifest.
//!
//! The manifest is stored as `cache.json` in the cache directory. It maps the
//! serialized [`CacheKey`](crate::CacheKey) of every successful unit build to
//! the [`CacheEntry`] listing that build's artifacts.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entry::CacheEntry;
use crate::error::CacheError;

/// Name of the manifest file within the cache directory.
pub const MANIFEST_FILE: &str = "cache.json";

/// Current manifest format version. A file with any other version is
/// discarded on load.
pub const MANIFEST_FORMAT_VERSION: u32 = 2;

/// Mapping from serialized cache key to cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Manifest format version.
    pub format_version: u32,

    /// Entries keyed by serialized cache key, sorted for stable output.
    pub entries: BTreeMap<String, CacheEntry>,
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheManifest {
    /// Creates a new, empty manifest.
    pub fn new() -> Self {
        Self {
            format_version: MANIFEST_FORMAT_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Reads a manifest file.
    ///
    /// Returns `Ok(None)` if the file does not exist and
    /// [`CacheError::ManifestParse`] if it is malformed or was written by an
    /// incompatible format version.
    pub fn read(path: &Path) -> Result<Option<Self>, CacheError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        let manifest: Self =
            serde_json::from_str(&content).map_err(|e| CacheError::ManifestParse {
                reason: e.to_string(),
            })?;
        if manifest.format_version != MANIFEST_FORMAT_VERSION {
            return Err(CacheError::ManifestParse {
                reason: format!(
                    "format version {} (expected {MANIFEST_FORMAT_VERSION})",
                    manifest.format_version
                ),
            });
        }
        Ok(Some(manifest))
    }

    /// Loads a manifest file, falling back to an empty manifest.
    ///
    /// This is fail-safe: a missing file is silently empty, and an unreadable
    /// or corrupt file is logged as a warning and treated as empty so the
    /// build proceeds with every unit as a cache miss.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(manifest)) => {
                log::debug!(
                    "loaded {} cache entries from {}",
                    manifest.entries.len(),
                    path.display()
                );
                manifest
            }
            Ok(None) => Self::new(),
            Err(e) => {
                log::warn!("ignoring cache at {}: {e}", path.display());
                Self::new()
            }
        }
    }

    /// Writes the manifest to `path` atomically.
    ///
    /// The JSON is written to a temporary file in the same directory, synced,
    /// and renamed over `path`, so readers see either the previous or the new
    /// manifest, never a truncated one. Creates the parent directory if needed.
    pub fn write_atomic(&self, path: &Path) -> Result<(), CacheError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;

        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}
