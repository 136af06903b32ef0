//! Command-line construction for each supported compiler.

use std::ffi::OsString;
use std::path::Path;

use shade_common::{Defines, Stage, ToolKind};

/// Builds the argument list for compiling one stage.
///
/// Order: fixed stage/output flags, then one `-D NAME=VALUE` pair per define
/// in insertion order, then the source path as the final positional argument.
pub fn invocation_args(
    tool: ToolKind,
    stage: Stage,
    source: &Path,
    output: &Path,
    defines: &Defines,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = match tool {
        ToolKind::Glslc => vec![format!("-fshader-stage={}", stage.name()).into()],
        ToolKind::GlslangValidator => vec!["-V".into(), "-S".into(), stage.extension().into()],
    };
    args.push("-o".into());
    args.push(output.into());
    for (name, value) in defines.iter() {
        args.push("-D".into());
        args.push(format!("{name}={value}").into());
    }
    args.push(source.into());
    args
}
