//! The compiler resolver: tool selection, invocation, and fallback.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use shade_common::{Defines, Stage, ToolKind};

use crate::args::invocation_args;
use crate::error::CompileError;
use crate::process::{run_with_timeout, RunError};
use crate::resolver::ExecutableResolver;

/// Default wall-clock limit for one compiler invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A compiler found on the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    /// Which compiler was found.
    pub kind: ToolKind,
    /// Its executable path.
    pub path: PathBuf,
}

/// How a stage artifact was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOutcome {
    /// A real compiler produced the artifact.
    Compiled {
        /// The compiler that ran.
        tool: ToolKind,
    },
    /// No compiler was discoverable; the artifact is a verbatim source copy.
    PassThrough,
}

impl CompileOutcome {
    /// Returns `true` for the copy-through fallback.
    pub fn is_passthrough(self) -> bool {
        matches!(self, CompileOutcome::PassThrough)
    }

    /// The compiler that ran, if any.
    pub fn tool(self) -> Option<ToolKind> {
        match self {
            CompileOutcome::Compiled { tool } => Some(tool),
            CompileOutcome::PassThrough => None,
        }
    }
}

/// Discovers an external compiler and compiles single shader stages with it.
///
/// Tools are resolved on every call, in priority order; the first one found
/// is used exclusively for that call. A found tool that fails is a hard
/// error and the next tool is not tried.
pub struct CompilerResolver {
    resolver: Box<dyn ExecutableResolver>,
    tools: Vec<ToolKind>,
    timeout: Duration,
}

impl CompilerResolver {
    /// Creates a resolver with the default tool order and timeout.
    pub fn new(resolver: Box<dyn ExecutableResolver>) -> Self {
        Self {
            resolver,
            tools: ToolKind::DEFAULT_ORDER.to_vec(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the tool priority order.
    pub fn with_tools(mut self, tools: Vec<ToolKind>) -> Self {
        self.tools = tools;
        self
    }

    /// Replaces the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The per-invocation timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the first discoverable tool in priority order.
    pub fn resolve(&self) -> Option<ResolvedTool> {
        self.tools.iter().find_map(|&kind| {
            let path = self.resolver.find(kind.executable_name())?;
            log::debug!("resolved {kind} at {}", path.display());
            Some(ResolvedTool { kind, path })
        })
    }

    /// Resolves a tool and compiles `source` for `stage` into `output`.
    ///
    /// See [`compile_with`](Self::compile_with).
    pub fn compile(
        &self,
        stage: Stage,
        source: &Path,
        output: &Path,
        defines: &Defines,
    ) -> Result<CompileOutcome, CompileError> {
        self.compile_with(self.resolve().as_ref(), stage, source, output, defines)
    }

    /// Compiles `source` for `stage` into `output` with an already resolved
    /// tool, so several stages of one unit use the same compiler.
    ///
    /// Creates the output's parent directory first. With no tool, copies the
    /// source to `output` and logs a warning.
    pub fn compile_with(
        &self,
        tool: Option<&ResolvedTool>,
        stage: Stage,
        source: &Path,
        output: &Path,
        defines: &Defines,
    ) -> Result<CompileOutcome, CompileError> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CompileError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let Some(resolved) = tool else {
            return self.pass_through(source, output);
        };
        let (tool, path) = (resolved.kind, &resolved.path);

        let mut command = Command::new(path);
        command.args(invocation_args(tool, stage, source, output, defines));
        log::debug!("running {command:?}");

        let result = run_with_timeout(command, self.timeout);
        match result {
            Ok(out) if out.status.success() => Ok(CompileOutcome::Compiled { tool }),
            Ok(out) => {
                let diagnostic = if out.stderr.trim().is_empty() {
                    out.stdout
                } else {
                    out.stderr
                };
                Err(CompileError::Failed {
                    tool,
                    status: out.status.to_string(),
                    diagnostic,
                })
            }
            Err(RunError::TimedOut) => Err(CompileError::Timeout {
                tool,
                timeout: self.timeout,
            }),
            Err(RunError::Spawn(e)) | Err(RunError::Wait(e)) => Err(CompileError::Spawn {
                tool,
                path: path.clone(),
                source: e,
            }),
        }
    }

    fn pass_through(&self, source: &Path, output: &Path) -> Result<CompileOutcome, CompileError> {
        let names: Vec<_> = self.tools.iter().map(|t| t.executable_name()).collect();
        log::warn!(
            "no shader compiler found (tried {}), copying {} as-is",
            names.join(", "),
            source.display()
        );
        std::fs::copy(source, output).map_err(|e| CompileError::Io {
            path: output.to_path_buf(),
            source: e,
        })?;
        Ok(CompileOutcome::PassThrough)
    }
}
