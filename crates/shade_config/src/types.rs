//! Configuration types deserialized from `shade.toml`.

use serde::Deserialize;
use shade_common::{Defines, ToolKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory holding `.vert` / `.frag` sources.
pub const DEFAULT_SOURCE_DIR: &str = "shaders/src";
/// Default directory receiving compiled artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "shaders/compiled";
/// Default directory holding the cache file.
pub const DEFAULT_CACHE_DIR: &str = ".shader_cache";
/// Default wall-clock limit for one compiler invocation.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Largest accepted compiler timeout, in seconds (one hour).
pub const MAX_TIMEOUT_SECS: u64 = 60 * 60;

/// The top-level pipeline configuration parsed from `shade.toml`.
///
/// Every section is optional; an empty file (or no file at all) yields the
/// same configuration as [`PipelineConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// External compiler settings.
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Extra preprocessor defines applied to every unit.
    #[serde(default)]
    pub defines: Defines,
}

/// Source, output, and cache directory locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory scanned for `<name>.vert` / `<name>.frag` pairs.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Directory receiving `<variant>/<name>.<stage>.spv` artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Directory holding `cache.json` and its lock file.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl PathsConfig {
    /// Joins every relative path onto `base`. Absolute paths are kept as-is.
    pub fn resolve_against(&mut self, base: &Path) {
        for path in [
            &mut self.source_dir,
            &mut self.output_dir,
            &mut self.cache_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// External compiler discovery and invocation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Wall-clock limit per compiler invocation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Tool names in discovery priority order.
    #[serde(default = "default_tools")]
    pub tools: Vec<String>,
    /// Reject the copy-through fallback used when no tool is found.
    #[serde(default)]
    pub strict: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            tools: default_tools(),
            strict: false,
        }
    }
}

impl CompilerConfig {
    /// The invocation timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured tools, in priority order. Unknown names are skipped;
    /// loading rejects them, so a validated config never has any.
    pub fn tool_order(&self) -> Vec<ToolKind> {
        self.tools
            .iter()
            .filter_map(|name| ToolKind::from_name(name))
            .collect()
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE_DIR)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_tools() -> Vec<String> {
    ToolKind::DEFAULT_ORDER
        .iter()
        .map(|t| t.executable_name().to_string())
        .collect()
}
