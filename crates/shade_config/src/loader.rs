//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{PipelineConfig, MAX_TIMEOUT_SECS};
use shade_common::defines::{is_valid_name, VARIANT_DEFINE};
use shade_common::ToolKind;
use std::path::Path;

/// Name of the configuration file looked up in the project directory.
pub const CONFIG_FILE: &str = "shade.toml";

/// Loads the configuration for a project directory.
///
/// Reads `<project_dir>/shade.toml` when present; otherwise returns the
/// defaults. Relative paths are resolved against `project_dir`.
pub fn load_config(project_dir: &Path) -> Result<PipelineConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        log::debug!(
            "no {} in {}, using defaults",
            CONFIG_FILE,
            project_dir.display()
        );
        let mut config = PipelineConfig::default();
        config.paths.resolve_against(project_dir);
        return Ok(config);
    }
    load_config_file(&config_path)
}

/// Loads an explicit configuration file, which must exist.
///
/// Relative paths are resolved against the file's parent directory.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = load_config_from_str(&content)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.paths.resolve_against(base);
    log::debug!("loaded configuration from {}", path.display());
    Ok(config)
}

/// Parses and validates a `shade.toml` configuration from a string.
///
/// Paths are left exactly as written. Useful for testing without
/// filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<PipelineConfig, ConfigError> {
    let config: PipelineConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates value ranges, tool names, and define names.
fn validate_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.compiler.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "compiler.timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.compiler.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::ValidationError(format!(
            "compiler.timeout_secs must be at most {MAX_TIMEOUT_SECS}"
        )));
    }
    if config.compiler.tools.is_empty() {
        return Err(ConfigError::ValidationError(
            "compiler.tools must list at least one tool".to_string(),
        ));
    }
    for name in &config.compiler.tools {
        if ToolKind::from_name(name).is_none() {
            return Err(ConfigError::UnknownTool(name.clone()));
        }
    }
    for (name, _) in config.defines.iter() {
        if !is_valid_name(name) {
            return Err(ConfigError::ValidationError(format!(
                "invalid define name '{name}'"
            )));
        }
        if name == VARIANT_DEFINE {
            return Err(ConfigError::ValidationError(format!(
                "define '{VARIANT_DEFINE}' is reserved for the build variant"
            )));
        }
    }
    Ok(())
}
