//! Error types for unit compilation and bulk builds.

use std::path::PathBuf;
use std::time::Duration;

use shade_cache::CacheError;
use shade_common::{Stage, ToolKind};

/// A failure of exactly one unit, with exactly one cause.
#[derive(Debug, thiserror::Error)]
#[error("unit '{unit}': {kind}")]
pub struct UnitError {
    /// Name of the unit that failed.
    pub unit: String,
    /// Why it failed.
    #[source]
    pub kind: UnitErrorKind,
}

impl UnitError {
    /// Creates a unit error.
    pub fn new(unit: impl Into<String>, kind: UnitErrorKind) -> Self {
        Self {
            unit: unit.into(),
            kind,
        }
    }
}

/// The cause of a [`UnitError`].
#[derive(Debug, thiserror::Error)]
pub enum UnitErrorKind {
    /// A required stage source file does not exist.
    #[error("{stage} source not found: {}", path.display())]
    SourceMissing {
        /// The missing stage.
        stage: Stage,
        /// Where the source was expected.
        path: PathBuf,
    },

    /// A stage source exists but could not be read for hashing.
    #[error("source unreadable: {}", path.display())]
    ReadFailure {
        /// The unreadable source.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: CacheError,
    },

    /// Strict mode is on and no compiler is discoverable.
    #[error("no shader compiler available for {stage} stage (strict mode)")]
    CompilerUnavailable {
        /// The stage that could not be compiled.
        stage: Stage,
    },

    /// The compiler exceeded its time limit.
    #[error("{stage} compilation with {tool} timed out after {}s", timeout.as_secs_f64())]
    CompilerTimeout {
        /// The stage being compiled.
        stage: Stage,
        /// The compiler that was running.
        tool: ToolKind,
        /// The limit that was exceeded.
        timeout: Duration,
    },

    /// The compiler ran and exited unsuccessfully.
    #[error("{stage} compilation with {tool} failed ({status}):\n{diagnostic}")]
    CompilerInvocationFailure {
        /// The stage being compiled.
        stage: Stage,
        /// The compiler that failed.
        tool: ToolKind,
        /// Description of the exit status.
        status: String,
        /// The compiler's diagnostic output, verbatim.
        diagnostic: String,
    },

    /// The compiler was found but could not be started.
    #[error("failed to start {tool} for {stage} stage: {source}")]
    CompilerSpawn {
        /// The stage being compiled.
        stage: Stage,
        /// The compiler that could not be started.
        tool: ToolKind,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact or its directory could not be written.
    #[error("cannot write artifact {}: {source}", path.display())]
    OutputWrite {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Both stages compiled but the cache could not be persisted.
    #[error("failed to update cache: {0}")]
    CacheWrite(#[source] CacheError),
}

/// Errors that prevent a bulk build from attempting any unit.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The source directory could not be listed.
    #[error("cannot scan source directory {}: {source}", dir.display())]
    Discovery {
        /// The directory being scanned.
        dir: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The source directory contains no `.vert` or `.frag` files.
    #[error("no shader units found in {}", dir.display())]
    NoUnits {
        /// The directory that was scanned.
        dir: PathBuf,
    },

    /// The cache store could not be opened.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
