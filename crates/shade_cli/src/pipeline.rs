//! Shared helpers for CLI commands: configuration resolution and reporting.

use std::path::{Path, PathBuf};

use shade_build::{BuildReport, UnitError, UnitOutcome};
use shade_config::PipelineConfig;

use crate::GlobalArgs;

/// Loads the pipeline configuration and applies command-line overrides.
///
/// `--config` may name a `shade.toml` file or the directory containing one.
/// Without it, `shade.toml` is looked up in the current directory and the
/// defaults are used when it is absent.
pub fn resolve_config(global: &GlobalArgs) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match global.config {
        Some(ref path) if path.is_file() => shade_config::load_config_file(path)?,
        Some(ref path) if path.is_dir() => shade_config::load_config(path)?,
        Some(ref path) => {
            return Err(format!("configuration not found: {}", path.display()).into());
        }
        None => shade_config::load_config(&std::env::current_dir()?)?,
    };
    apply_overrides(&mut config, global);
    Ok(config)
}

/// Replaces configured values with those given on the command line.
fn apply_overrides(config: &mut PipelineConfig, global: &GlobalArgs) {
    override_path(&mut config.paths.source_dir, global.source_dir.as_deref());
    override_path(&mut config.paths.output_dir, global.output_dir.as_deref());
    override_path(&mut config.paths.cache_dir, global.cache_dir.as_deref());
    if global.strict {
        config.compiler.strict = true;
    }
}

fn override_path(slot: &mut PathBuf, value: Option<&Path>) {
    if let Some(value) = value {
        *slot = value.to_path_buf();
    }
}

/// Prints one line per failure and the summary, returning the exit code.
pub fn render_report(report: &BuildReport, quiet: bool) -> i32 {
    for failure in report.failures() {
        render_failure(failure);
    }
    if !quiet {
        eprintln!(
            "compiled {}, cached {}, failed {}",
            report.compiled(),
            report.cached(),
            report.failed()
        );
    }
    exit_code(report)
}

/// Prints a single-unit failure as `error: unit '<name>': <reason>`.
pub fn render_failure(error: &UnitError) {
    eprintln!("error: {error}");
}

/// Counts a single unit's result into a one-entry report.
pub fn single_report(name: &str, result: Result<UnitOutcome, UnitError>) -> BuildReport {
    BuildReport {
        results: vec![(name.to_string(), result)],
    }
}

/// 0 iff every attempted unit succeeded.
pub fn exit_code(report: &BuildReport) -> i32 {
    if report.success() {
        0
    } else {
        1
    }
}
