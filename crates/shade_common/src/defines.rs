//! Preprocessor defines passed to the shader compiler.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::ContentHash;

/// Name of the define that carries the build variant.
pub const VARIANT_DEFINE: &str = "VARIANT";

/// An insertion-ordered mapping of define names to values.
///
/// Iteration order is the order in which names were first inserted, so the
/// `-D` flags of a compiler invocation are reproducible run to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Defines(IndexMap<String, String>);

/// Error returned when a `NAME=VALUE` define cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDefineError(pub String);

impl fmt::Display for ParseDefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid define '{}' (expected NAME=VALUE)", self.0)
    }
}

impl std::error::Error for ParseDefineError {}

impl Defines {
    /// Creates an empty define set.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Sets `name` to `value`. A name that is already present keeps its
    /// position and takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Removes `name`, preserving the order of the remaining defines.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.shift_remove(name)
    }

    /// Number of defines.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no defines are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Applies every define of `other` on top of `self`.
    pub fn extend_from(&mut self, other: &Defines) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Parses a single `NAME=VALUE` (or bare `NAME`, meaning `NAME=1`) define.
    pub fn parse_pair(s: &str) -> Result<(String, String), ParseDefineError> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name, value),
            None => (s, "1"),
        };
        if !is_valid_name(name) {
            return Err(ParseDefineError(s.to_string()));
        }
        Ok((name.to_string(), value.to_string()))
    }

    /// Digest of the define set, independent of insertion order.
    ///
    /// Returns `None` for an empty set.
    pub fn digest(&self) -> Option<ContentHash> {
        if self.0.is_empty() {
            return None;
        }
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable();
        let mut buf = Vec::new();
        for (name, value) in pairs {
            buf.extend_from_slice(name.as_bytes());
            buf.push(0);
            buf.extend_from_slice(value.as_bytes());
            buf.push(0);
        }
        Some(ContentHash::from_bytes(&buf))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Defines {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut defines = Defines::new();
        for (k, v) in iter {
            defines.insert(k, v);
        }
        defines
    }
}

/// Returns `true` if `name` is a valid preprocessor identifier.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
