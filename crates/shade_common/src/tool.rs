//! Known external shader compiler executables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An external GLSL compiler the pipeline knows how to drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// `glslc` from the Vulkan SDK / shaderc.
    #[serde(rename = "glslc")]
    Glslc,
    /// `glslangValidator` from the Khronos reference front end.
    #[serde(rename = "glslangValidator")]
    GlslangValidator,
}

impl ToolKind {
    /// Default discovery order.
    pub const DEFAULT_ORDER: [ToolKind; 2] = [ToolKind::Glslc, ToolKind::GlslangValidator];

    /// Executable name searched for on the tool search path.
    pub fn executable_name(self) -> &'static str {
        match self {
            ToolKind::Glslc => "glslc",
            ToolKind::GlslangValidator => "glslangValidator",
        }
    }

    /// Looks up a tool by its executable name.
    pub fn from_name(name: &str) -> Option<ToolKind> {
        Self::DEFAULT_ORDER
            .into_iter()
            .find(|t| t.executable_name() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable_name())
    }
}
