//! Composite cache keys.

use std::fmt;

use shade_common::{ContentHash, Variant};

/// Identity of one build of a source unit.
///
/// Two builds are equivalent iff unit name, variant, and both stage digests
/// match exactly. The optional defines digest is present only when extra
/// preprocessor defines were supplied beyond the variant define.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Unit name (the shared file stem).
    pub unit: String,
    /// Build variant.
    pub variant: Variant,
    /// Digest of the vertex-stage source bytes.
    pub vertex: ContentHash,
    /// Digest of the fragment-stage source bytes.
    pub fragment: ContentHash,
    /// Digest of the extra define set, if non-empty.
    pub defines: Option<ContentHash>,
}

impl CacheKey {
    /// Creates a key with no extra defines.
    pub fn new(
        unit: impl Into<String>,
        variant: Variant,
        vertex: ContentHash,
        fragment: ContentHash,
    ) -> Self {
        Self {
            unit: unit.into(),
            variant,
            vertex,
            fragment,
            defines: None,
        }
    }

    /// Adds the digest of the extra define set.
    pub fn with_defines(mut self, defines: Option<ContentHash>) -> Self {
        self.defines = defines;
        self
    }
}

/// Serialized form used as the key in `cache.json`:
/// `unit:variant:<vertex>:<fragment>[:<defines>]`.
impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.unit, self.variant, self.vertex, self.fragment
        )?;
        if let Some(defines) = &self.defines {
            write!(f, ":{defines}")?;
        }
        Ok(())
    }
}
