//! The compilation orchestrator.
//!
//! Each unit runs through the same sequence: check that both sources exist,
//! hash them, look up the composite key, and on a miss compile the vertex
//! stage then the fragment stage with a single resolved compiler. A cache
//! entry is written (and persisted) only after both stages succeed.

use std::path::PathBuf;

use shade_cache::{CacheEntry, CacheError, CacheKey, CacheStore, FileCacheStore, SourceHasher};
use shade_common::defines::VARIANT_DEFINE;
use shade_common::{ContentHash, Defines, Stage, Variant};
use shade_compiler::{
    CompileError, CompileOutcome, CompilerResolver, ResolvedTool, SearchPathResolver,
};
use shade_config::PipelineConfig;

use crate::discover::discover_units;
use crate::error::{BuildError, UnitError, UnitErrorKind};
use crate::report::{BuildReport, UnitOutcome};
use crate::unit::SourceUnit;

/// Directory layout and policy for a build.
#[derive(Debug, Clone, Default)]
pub struct BuildSettings {
    /// Directory holding `<name>.vert` / `<name>.frag` sources.
    pub source_dir: PathBuf,
    /// Directory receiving compiled artifacts.
    pub output_dir: PathBuf,
    /// Defines applied to every unit before caller-supplied defines.
    pub defines: Defines,
    /// Reject the copy-through fallback and cached fallback entries.
    pub strict: bool,
}

impl BuildSettings {
    /// Extracts the build settings from a pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            source_dir: config.paths.source_dir.clone(),
            output_dir: config.paths.output_dir.clone(),
            defines: config.defines.clone(),
            strict: config.compiler.strict,
        }
    }
}

/// Drives per-unit compilation against a cache store.
pub struct Orchestrator<S: CacheStore> {
    settings: BuildSettings,
    compiler: CompilerResolver,
    store: S,
}

impl Orchestrator<FileCacheStore> {
    /// Builds an orchestrator from configuration: compilers are searched on
    /// `PATH` and the cache lives in the configured cache directory.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, BuildError> {
        let compiler = CompilerResolver::new(Box::new(SearchPathResolver::from_env()))
            .with_tools(config.compiler.tool_order())
            .with_timeout(config.compiler.timeout());
        let store = FileCacheStore::open(&config.paths.cache_dir)?;
        Ok(Self::new(BuildSettings::from_config(config), compiler, store))
    }
}

impl<S: CacheStore> Orchestrator<S> {
    /// Creates an orchestrator from its parts.
    pub fn new(settings: BuildSettings, compiler: CompilerResolver, store: S) -> Self {
        Self {
            settings,
            compiler,
            store,
        }
    }

    /// The build settings.
    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// The cache store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the orchestrator, returning its cache store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Compiles one unit, or confirms its cached artifacts are current.
    ///
    /// `defines` are applied on top of the configured defines; `VARIANT` is
    /// always set to the variant's uppercase name and cannot be overridden.
    pub fn compile_unit(
        &mut self,
        name: &str,
        variant: Variant,
        defines: &Defines,
    ) -> Result<UnitOutcome, UnitError> {
        let fail = |kind| UnitError::new(name, kind);
        let unit = SourceUnit::locate(&self.settings.source_dir, name);

        for stage in Stage::ALL {
            let path = unit.source(stage);
            if !path.is_file() {
                return Err(fail(UnitErrorKind::SourceMissing {
                    stage,
                    path: path.to_path_buf(),
                }));
            }
        }

        let vertex = hash_source(&unit, Stage::Vertex).map_err(fail)?;
        let fragment = hash_source(&unit, Stage::Fragment).map_err(fail)?;

        let mut extra = self.settings.defines.clone();
        extra.extend_from(defines);
        extra.remove(VARIANT_DEFINE);
        let key = CacheKey::new(name, variant, vertex, fragment).with_defines(extra.digest());

        if let Some(entry) = self.store.get(&key) {
            if self.settings.strict && entry.passthrough {
                log::debug!("ignoring pass-through cache entry for {name} in strict mode");
            } else {
                log::info!("cache hit: {name} ({variant})");
                return Ok(UnitOutcome::CacheHit);
            }
        }
        log::debug!("cache miss: {key}");

        let tool = self.compiler.resolve();
        if tool.is_none() && self.settings.strict {
            return Err(fail(UnitErrorKind::CompilerUnavailable {
                stage: Stage::Vertex,
            }));
        }

        let mut effective = extra;
        effective.insert(VARIANT_DEFINE, variant.define_value());

        let vertex_out =
            self.compile_stage(&unit, Stage::Vertex, variant, tool.as_ref(), &effective)?;
        let fragment_out =
            self.compile_stage(&unit, Stage::Fragment, variant, tool.as_ref(), &effective)?;

        let passthrough = vertex_out.is_passthrough() || fragment_out.is_passthrough();
        let mut entry = CacheEntry::record(
            unit.artifact_path(&self.settings.output_dir, variant, Stage::Vertex),
            unit.artifact_path(&self.settings.output_dir, variant, Stage::Fragment),
        )
        .map_err(|e| fail(UnitErrorKind::CacheWrite(e)))?;
        entry.passthrough = passthrough;
        entry.tool = tool.map(|t| t.kind.to_string());

        self.store.put(&key, entry);
        if let Err(e) = self.store.persist() {
            self.store.remove(&key);
            return Err(fail(UnitErrorKind::CacheWrite(e)));
        }

        log::info!("compiled {name} ({variant})");
        Ok(UnitOutcome::Compiled { passthrough })
    }

    /// Compiles every unit discovered in the source directory.
    ///
    /// Each unit is attempted even if earlier ones failed. Only discovery
    /// problems are returned as an error; unit failures are in the report.
    pub fn compile_all(&mut self, variant: Variant) -> Result<BuildReport, BuildError> {
        let names = discover_units(&self.settings.source_dir)?;
        if names.is_empty() {
            return Err(BuildError::NoUnits {
                dir: self.settings.source_dir.clone(),
            });
        }

        let mut report = BuildReport::default();
        for name in names {
            let result = self.compile_unit(&name, variant, &Defines::new());
            report.results.push((name, result));
        }
        Ok(report)
    }

    fn compile_stage(
        &self,
        unit: &SourceUnit,
        stage: Stage,
        variant: Variant,
        tool: Option<&ResolvedTool>,
        defines: &Defines,
    ) -> Result<CompileOutcome, UnitError> {
        let output = unit.artifact_path(&self.settings.output_dir, variant, stage);
        log::info!("compiling {} ({variant})", unit.source(stage).display());
        self.compiler
            .compile_with(tool, stage, unit.source(stage), &output, defines)
            .map_err(|e| UnitError::new(&unit.name, stage_error(stage, e)))
    }
}

fn hash_source(unit: &SourceUnit, stage: Stage) -> Result<ContentHash, UnitErrorKind> {
    let path = unit.source(stage);
    SourceHasher::hash_file(path).map_err(|source: CacheError| UnitErrorKind::ReadFailure {
        path: path.to_path_buf(),
        source,
    })
}

fn stage_error(stage: Stage, err: CompileError) -> UnitErrorKind {
    match err {
        CompileError::Timeout { tool, timeout } => UnitErrorKind::CompilerTimeout {
            stage,
            tool,
            timeout,
        },
        CompileError::Failed {
            tool,
            status,
            diagnostic,
        } => UnitErrorKind::CompilerInvocationFailure {
            stage,
            tool,
            status,
            diagnostic,
        },
        CompileError::Spawn { tool, source, .. } => UnitErrorKind::CompilerSpawn {
            stage,
            tool,
            source,
        },
        CompileError::Io { path, source } => UnitErrorKind::OutputWrite { path, source },
    }
}
