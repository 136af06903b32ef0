//! External shader compiler discovery and invocation.
//!
//! The [`CompilerResolver`] walks a fixed priority list of GLSL compilers,
//! uses the first one found on the search path, and runs it under a
//! wall-clock timeout. When no compiler can be found it copies the source
//! through unchanged and says so loudly.

#![warn(missing_docs)]

pub mod args;
pub mod compiler;
pub mod error;
pub mod process;
pub mod resolver;

pub use compiler::{CompileOutcome, CompilerResolver, ResolvedTool, DEFAULT_TIMEOUT};
pub use error::CompileError;
pub use resolver::{ExecutableResolver, SearchPathResolver};
