//! Cache entries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shade_common::{ContentHash, Stage};

use crate::error::CacheError;
use crate::hasher::SourceHasher;

/// Artifacts produced by one successful build of a unit.
///
/// Artifact paths are shared by every key of a unit and variant, so an entry
/// records the digest of each artifact as written and is only trusted while
/// the files on disk still have those digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Compiled vertex-stage artifact.
    pub vertex: PathBuf,
    /// Digest of the vertex artifact when the entry was recorded.
    pub vertex_hash: ContentHash,
    /// Compiled fragment-stage artifact.
    pub fragment: PathBuf,
    /// Digest of the fragment artifact when the entry was recorded.
    pub fragment_hash: ContentHash,
    /// `true` if the artifacts are verbatim source copies because no
    /// compiler was discoverable.
    #[serde(default)]
    pub passthrough: bool,
    /// Name of the compiler that produced the artifacts, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl CacheEntry {
    /// Records the artifacts at `vertex` and `fragment` as they are on disk now.
    pub fn record(vertex: PathBuf, fragment: PathBuf) -> Result<Self, CacheError> {
        let vertex_hash = SourceHasher::hash_file(&vertex)?;
        let fragment_hash = SourceHasher::hash_file(&fragment)?;
        Ok(Self {
            vertex,
            vertex_hash,
            fragment,
            fragment_hash,
            passthrough: false,
            tool: None,
        })
    }

    /// Returns the artifact path for `stage`.
    pub fn artifact(&self, stage: Stage) -> &Path {
        match stage {
            Stage::Vertex => &self.vertex,
            Stage::Fragment => &self.fragment,
        }
    }

    /// Returns the recorded artifact digest for `stage`.
    pub fn artifact_hash(&self, stage: Stage) -> ContentHash {
        match stage {
            Stage::Vertex => self.vertex_hash,
            Stage::Fragment => self.fragment_hash,
        }
    }

    /// Iterates over every artifact path.
    pub fn artifacts(&self) -> impl Iterator<Item = &Path> {
        Stage::ALL.into_iter().map(move |s| self.artifact(s))
    }

    /// Returns `true` if every artifact currently exists on disk.
    pub fn artifacts_exist(&self) -> bool {
        self.artifacts().all(Path::exists)
    }

    /// Returns `true` if every artifact exists with its recorded digest.
    ///
    /// `false` means another build has since overwritten (or something has
    /// removed) at least one of the files.
    pub fn artifacts_current(&self) -> bool {
        Stage::ALL.into_iter().all(|stage| {
            SourceHasher::hash_file(self.artifact(stage))
                .is_ok_and(|hash| hash == self.artifact_hash(stage))
        })
    }
}
