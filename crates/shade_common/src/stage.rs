//! Shader pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two compilation targets within a source unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// The vertex stage (`<name>.vert`).
    Vertex,
    /// The fragment stage (`<name>.frag`).
    Fragment,
}

impl Stage {
    /// Both stages in compilation order.
    pub const ALL: [Stage; 2] = [Stage::Vertex, Stage::Fragment];

    /// File extension of the stage's source file, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Stage::Vertex => "vert",
            Stage::Fragment => "frag",
        }
    }

    /// Full lowercase stage name (`vertex` / `fragment`).
    pub fn name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }

    /// Maps a source file extension back to its stage.
    pub fn from_extension(ext: &str) -> Option<Stage> {
        match ext {
            "vert" => Some(Stage::Vertex),
            "frag" => Some(Stage::Fragment),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
