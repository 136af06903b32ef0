//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `shade.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A tool name in `compiler.tools` is not a supported compiler.
    #[error("unknown compiler tool '{0}'")]
    UnknownTool(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
