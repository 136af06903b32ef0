//! Shared foundational types used across the shade shader pipeline.
//!
//! This crate provides the content digest used for cache keys, the shader
//! stage, build variant and compiler tool enumerations, and the ordered define
//! map passed to external compilers.

#![warn(missing_docs)]

pub mod defines;
pub mod hash;
pub mod stage;
pub mod tool;
pub mod variant;

pub use defines::{Defines, ParseDefineError, VARIANT_DEFINE};
pub use hash::ContentHash;
pub use stage::Stage;
pub use tool::ToolKind;
pub use variant::{ParseVariantError, Variant};
