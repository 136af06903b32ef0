//! Compilation orchestration for shader source units.
//!
//! A source unit is a `<name>.vert` / `<name>.frag` pair. The
//! [`Orchestrator`] hashes both sources, consults the cache store, and on a
//! miss compiles both stages with one resolved compiler before recording the
//! new cache entry. [`Orchestrator::compile_all`] does this for every unit
//! discovered in the source directory and keeps going past failures.

#![warn(missing_docs)]

pub mod discover;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod unit;

pub use discover::discover_units;
pub use error::{BuildError, UnitError, UnitErrorKind};
pub use orchestrator::{BuildSettings, Orchestrator};
pub use report::{BuildReport, UnitOutcome, UnitResult};
pub use unit::SourceUnit;
