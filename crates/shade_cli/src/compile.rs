//! `shade compile` and `shade all`: incremental builds of shader units.

use shade_build::Orchestrator;
use shade_common::{Defines, Variant};

use crate::pipeline::{render_report, resolve_config, single_report};
use crate::{CompileArgs, GlobalArgs};

/// Runs `shade compile <NAME>`.
///
/// Returns exit code 0 if the unit compiled or was already cached, 1 otherwise.
pub fn run_one(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(global)?;
    let mut orchestrator = Orchestrator::from_config(&config)?;

    let defines: Defines = args.defines.iter().cloned().collect();
    let variant = Variant::from(args.variant);
    let result = orchestrator.compile_unit(&args.name, variant, &defines);
    Ok(render_report(&single_report(&args.name, result), global.quiet))
}

/// Runs `shade all`, attempting every discovered unit.
///
/// Returns exit code 0 only if every unit succeeded.
pub fn run_all(variant: Variant, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(global)?;
    let mut orchestrator = Orchestrator::from_config(&config)?;

    log::info!(
        "building {} shaders from {}",
        variant,
        config.paths.source_dir.display()
    );
    let report = orchestrator.compile_all(variant)?;
    Ok(render_report(&report, global.quiet))
}
