//! Source units and their artifact locations.

use std::path::{Path, PathBuf};

use shade_common::{Stage, Variant};

/// A named shader made of a vertex and a fragment source sharing a stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// The shared file stem, e.g. `basic` for `basic.vert` / `basic.frag`.
    pub name: String,
    /// Path of the vertex-stage source.
    pub vertex: PathBuf,
    /// Path of the fragment-stage source.
    pub fragment: PathBuf,
}

impl SourceUnit {
    /// Locates the sources of unit `name` inside `source_dir`.
    ///
    /// The files are not required to exist.
    pub fn locate(source_dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            vertex: source_dir.join(format!("{name}.{}", Stage::Vertex.extension())),
            fragment: source_dir.join(format!("{name}.{}", Stage::Fragment.extension())),
        }
    }

    /// The source path of `stage`.
    pub fn source(&self, stage: Stage) -> &Path {
        match stage {
            Stage::Vertex => &self.vertex,
            Stage::Fragment => &self.fragment,
        }
    }

    /// Where the compiled artifact of `stage` is written:
    /// `<output_dir>/<variant>/<name>.<ext>.spv`.
    pub fn artifact_path(&self, output_dir: &Path, variant: Variant, stage: Stage) -> PathBuf {
        output_dir
            .join(variant.as_str())
            .join(format!("{}.{}.spv", self.name, stage.extension()))
    }
}
