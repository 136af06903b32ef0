//! Error types for compiler invocation.

use std::path::PathBuf;
use std::time::Duration;

use shade_common::ToolKind;

/// Errors produced while compiling one shader stage.
///
/// A discovered compiler that fails is never retried with the next tool in
/// the priority list; every variant here is terminal for the stage.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The compiler did not exit within the allotted time and was killed.
    #[error("{tool} timed out after {}s", timeout.as_secs_f64())]
    Timeout {
        /// The compiler that was running.
        tool: ToolKind,
        /// The limit that was exceeded.
        timeout: Duration,
    },

    /// The compiler ran and exited unsuccessfully.
    #[error("{tool} failed ({status}):\n{diagnostic}")]
    Failed {
        /// The compiler that failed.
        tool: ToolKind,
        /// Description of the exit status.
        status: String,
        /// The compiler's diagnostic output, verbatim.
        diagnostic: String,
    },

    /// The compiler executable was found but could not be started.
    #[error("failed to start {tool} at {path}: {source}")]
    Spawn {
        /// The compiler that could not be started.
        tool: ToolKind,
        /// The resolved executable path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O error occurred while preparing or copying an artifact.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
