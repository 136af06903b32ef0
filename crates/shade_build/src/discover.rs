//! Source unit discovery.

use std::collections::BTreeSet;
use std::path::Path;

use shade_common::Stage;

use crate::error::BuildError;

/// Lists the unit names present in `source_dir`, sorted.
///
/// Every file stem with a `.vert` or `.frag` extension names a unit, so a
/// unit missing one of its stages is still discovered (and later fails with
/// a missing-source error instead of being skipped). Subdirectories are not
/// scanned.
pub fn discover_units(source_dir: &Path) -> Result<Vec<String>, BuildError> {
    let scan_err = |source| BuildError::Discovery {
        dir: source_dir.to_path_buf(),
        source,
    };
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(source_dir).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        if !path.is_file() {
            continue;
        }
        let is_stage_source = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Stage::from_extension)
            .is_some();
        if !is_stage_source {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.insert(stem.to_string());
        }
    }
    Ok(names.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_pairs_and_singletons() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["basic.vert", "basic.frag", "shadow.vert", "post.frag"] {
            std::fs::write(dir.path().join(file), "").unwrap();
        }
        let units = discover_units(dir.path()).unwrap();
        assert_eq!(units, vec!["basic", "post", "shadow"]);
    }

    #[test]
    fn ignores_other_files_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("basic.vert"), "").unwrap();
        std::fs::write(dir.path().join("common.glsl"), "").unwrap();
        std::fs::write(dir.path().join("README.md"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested.frag")).unwrap();

        assert_eq!(discover_units(dir.path()).unwrap(), vec!["basic"]);
    }

    #[test]
    fn empty_directory_yields_no_units() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_units(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_units(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, BuildError::Discovery { .. }));
    }
}
