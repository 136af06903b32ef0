//! Source file hashing.

use std::path::Path;

use shade_common::ContentHash;

use crate::error::CacheError;

/// Utility for computing content hashes of shader sources.
pub struct SourceHasher;

impl SourceHasher {
    /// Computes the content hash of a single file.
    ///
    /// Reads the whole file and returns its SHA-256 digest. Read failures
    /// are returned to the caller, never swallowed.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let content = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_file_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basic.vert");
        std::fs::write(&path, "#version 450\nvoid main() {}\n").unwrap();

        let h1 = SourceHasher::hash_file(&path).unwrap();
        let h2 = SourceHasher::hash_file(&path).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basic.frag");
        std::fs::write(&path, b"void main() {}").unwrap();
        assert_eq!(
            SourceHasher::hash_file(&path).unwrap(),
            ContentHash::from_bytes(b"void main() {}")
        );
    }

    #[test]
    fn hash_ignores_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.vert");
        let b = dir.path().join("b.vert");
        std::fs::write(&a, "same").unwrap();
        std::fs::write(&b, "same").unwrap();
        assert_eq!(
            SourceHasher::hash_file(&a).unwrap(),
            SourceHasher::hash_file(&b).unwrap()
        );
    }

    #[test]
    fn hash_file_modified_differs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basic.frag");
        std::fs::write(&path, "out vec4 c;").unwrap();
        let before = SourceHasher::hash_file(&path).unwrap();
        std::fs::write(&path, "out vec4 d;").unwrap();
        let after = SourceHasher::hash_file(&path).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn hash_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceHasher::hash_file(&dir.path().join("missing.vert")).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }
}
