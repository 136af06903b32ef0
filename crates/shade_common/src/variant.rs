//! Build variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named build configuration affecting preprocessor defines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Debug build.
    Debug,
    /// Release build.
    #[default]
    Release,
}

impl Variant {
    /// Lowercase name used in cache keys and artifact directories.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Debug => "debug",
            Variant::Release => "release",
        }
    }

    /// Value of the `VARIANT` define passed to the compiler.
    pub fn define_value(self) -> &'static str {
        match self {
            Variant::Debug => "DEBUG",
            Variant::Release => "RELEASE",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known variant name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVariantError(pub String);

impl fmt::Display for ParseVariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown build variant '{}' (expected debug or release)", self.0)
    }
}

impl std::error::Error for ParseVariantError {}

impl FromStr for Variant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Variant::Debug),
            "release" => Ok(Variant::Release),
            other => Err(ParseVariantError(other.to_string())),
        }
    }
}
