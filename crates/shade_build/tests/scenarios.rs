//! End-to-end unit builds against real child processes.
//!
//! A fake `glslc` shell script stands in for the compiler. It records every
//! source it is asked to compile, fails on sources containing `BROKEN`, and
//! otherwise writes an artifact made of a header line listing the `-D`
//! defines it was given followed by the source.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use shade_build::{BuildSettings, Orchestrator, UnitErrorKind, UnitOutcome};
use shade_cache::{CacheManifest, CacheStore, FileCacheStore};
use shade_common::{ContentHash, Defines, Stage, ToolKind, Variant};
use shade_compiler::{CompilerResolver, SearchPathResolver};

const FAKE_GLSLC: &str = r#"#!/bin/sh
out=""
prev=""
defs=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  if [ "$prev" = "-D" ]; then defs="$defs $arg"; fi
  prev="$arg"
  src="$arg"
done
echo "$src" >> "$(dirname "$0")/invocations.log"
if grep -q BROKEN "$src"; then
  echo "$src:1: error: BROKEN token" >&2
  exit 1
fi
{ printf 'SPIRV DEFS:%s\n' "$defs"; cat "$src"; } > "$out"
"#;

const VERT: &str = "#version 450\nvoid main() { gl_Position = vec4(0.0); }\n";
const FRAG: &str = concat!(
    "#version 450\n",
    "layout(location = 0) out vec4 c;\n",
    "void main() { c = vec4(1.0); }\n",
);

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// Captures warnings so tests can assert the pass-through fallback is loud.
struct CaptureLogger;

static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());

impl log::Log for CaptureLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            WARNINGS
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

fn install_logger() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let _ = log::set_boxed_logger(Box::new(CaptureLogger));
        log::set_max_level(log::LevelFilter::Warn);
    });
}

struct Project {
    root: tempfile::TempDir,
}

impl Project {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("src")).unwrap();
        std::fs::create_dir_all(root.path().join("bin")).unwrap();
        Self { root }
    }

    fn with_basic() -> Self {
        let project = Self::new();
        project.write_source("basic.vert", VERT);
        project.write_source("basic.frag", FRAG);
        project
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    fn write_source(&self, file: &str, content: &str) {
        std::fs::write(self.path("src").join(file), content).unwrap();
    }

    fn install_tool(&self, name: &str, script: &str) {
        let path = self.path("bin").join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(self.path("bin/invocations.log"))
            .unwrap_or_default()
            .lines()
            .map(|line| {
                Path::new(line)
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    fn artifact(&self, variant: &str, file: &str) -> PathBuf {
        self.path("out").join(variant).join(file)
    }

    fn manifest(&self) -> Option<CacheManifest> {
        CacheManifest::read(&self.path("cache/cache.json")).unwrap()
    }

    /// A fresh orchestrator, as a new process would build it.
    fn orchestrator(&self, timeout: Duration) -> Orchestrator<FileCacheStore> {
        let settings = BuildSettings {
            source_dir: self.path("src"),
            output_dir: self.path("out"),
            defines: Defines::new(),
            strict: false,
        };
        let compiler = CompilerResolver::new(Box::new(SearchPathResolver::new([self.path("bin")])))
            .with_timeout(timeout);
        let store = FileCacheStore::open(&self.path("cache")).unwrap();
        Orchestrator::new(settings, compiler, store)
    }

    fn compile_basic(&self) -> Result<UnitOutcome, shade_build::UnitError> {
        self.compile_basic_with(&Defines::new())
    }

    fn compile_basic_with(
        &self,
        defines: &Defines,
    ) -> Result<UnitOutcome, shade_build::UnitError> {
        self.orchestrator(Duration::from_secs(10))
            .compile_unit("basic", Variant::Release, defines)
    }

    fn artifact_header(&self, file: &str) -> String {
        let text = std::fs::read_to_string(self.artifact("release", file)).unwrap();
        text.lines().next().unwrap_or_default().to_string()
    }
}

#[test]
fn scenario_a_fresh_unit_compiles_both_stages() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);

    let outcome = project.compile_basic().unwrap();
    assert_eq!(outcome, UnitOutcome::Compiled { passthrough: false });
    assert_eq!(project.invocations(), vec!["basic.vert", "basic.frag"]);

    let manifest = project.manifest().unwrap();
    let expected_key = format!(
        "basic:release:{}:{}",
        ContentHash::from_bytes(VERT.as_bytes()),
        ContentHash::from_bytes(FRAG.as_bytes())
    );
    let entry = &manifest.entries[&expected_key];
    assert_eq!(entry.vertex, project.artifact("release", "basic.vert.spv"));
    assert_eq!(entry.fragment, project.artifact("release", "basic.frag.spv"));
    assert!(!entry.passthrough);
    assert_eq!(entry.tool.as_deref(), Some(ToolKind::Glslc.executable_name()));

    let artifact = std::fs::read_to_string(&entry.vertex).unwrap();
    assert_eq!(artifact, format!("SPIRV DEFS: VARIANT=RELEASE\n{VERT}"));
}

#[test]
fn scenario_b_rerun_is_a_cache_hit() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);

    project.compile_basic().unwrap();
    let outcome = project.compile_basic().unwrap();

    assert_eq!(outcome, UnitOutcome::CacheHit);
    assert_eq!(project.invocations().len(), 2, "no compiler runs on a hit");
}

#[test]
fn scenario_c_fragment_edit_recompiles_both_stages() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);

    project.compile_basic().unwrap();
    project.compile_basic().unwrap();
    project.write_source("basic.frag", &FRAG.replace("1.0", "0.5"));

    let outcome = project.compile_basic().unwrap();
    assert!(matches!(outcome, UnitOutcome::Compiled { .. }));
    assert_eq!(
        project.invocations(),
        vec!["basic.vert", "basic.frag", "basic.vert", "basic.frag"]
    );
    assert_eq!(project.manifest().unwrap().entries.len(), 2);
}

#[test]
fn scenario_d_bulk_build_reports_failure_but_builds_the_rest() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);
    project.write_source("incomplete.vert", VERT);

    let report = project
        .orchestrator(Duration::from_secs(10))
        .compile_all(Variant::Release)
        .unwrap();

    assert!(!report.success());
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.unit, "incomplete");
    assert!(matches!(
        failure.kind,
        UnitErrorKind::SourceMissing {
            stage: Stage::Fragment,
            ..
        }
    ));
    assert!(project.artifact("release", "basic.vert.spv").exists());
    assert!(project.artifact("release", "basic.frag.spv").exists());
    assert_eq!(report.compiled(), 1);
}

#[test]
fn fragment_failure_writes_no_entry_and_retry_recompiles_vertex() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);
    project.write_source("basic.frag", "BROKEN\n");

    let err = project.compile_basic().unwrap_err();
    match &err.kind {
        UnitErrorKind::CompilerInvocationFailure {
            stage, diagnostic, ..
        } => {
            assert_eq!(*stage, Stage::Fragment);
            assert!(diagnostic.contains("BROKEN token"));
        }
        other => panic!("expected invocation failure, got {other:?}"),
    }
    assert!(project.manifest().is_none(), "no cache entry for partial unit");
    assert_eq!(project.invocations(), vec!["basic.vert", "basic.frag"]);

    project.write_source("basic.frag", FRAG);
    project.compile_basic().unwrap();
    assert_eq!(
        project.invocations(),
        vec!["basic.vert", "basic.frag", "basic.vert", "basic.frag"]
    );
}

#[test]
fn vertex_failure_skips_fragment() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);
    project.write_source("basic.vert", "BROKEN\n");

    let err = project.compile_basic().unwrap_err();
    assert!(matches!(
        err.kind,
        UnitErrorKind::CompilerInvocationFailure {
            stage: Stage::Vertex,
            ..
        }
    ));
    assert_eq!(project.invocations(), vec!["basic.vert"]);
}

#[test]
fn deleted_artifact_is_rebuilt() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);

    project.compile_basic().unwrap();
    std::fs::remove_file(project.artifact("release", "basic.frag.spv")).unwrap();

    let outcome = project.compile_basic().unwrap();
    assert!(matches!(outcome, UnitOutcome::Compiled { .. }));
    assert_eq!(project.invocations().len(), 4);
    assert!(project.artifact("release", "basic.frag.spv").exists());
}

#[test]
fn slow_compiler_times_out_without_entry() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", "#!/bin/sh\nexec sleep 5\n");

    let err = project
        .orchestrator(Duration::from_millis(200))
        .compile_unit("basic", Variant::Release, &Defines::new())
        .unwrap_err();

    assert!(matches!(
        err.kind,
        UnitErrorKind::CompilerTimeout {
            stage: Stage::Vertex,
            tool: ToolKind::Glslc,
            ..
        }
    ));
    assert!(project.manifest().is_none());
}

#[test]
fn missing_compiler_falls_back_with_warning() {
    let _guard = serial();
    install_logger();
    let project = Project::with_basic();

    let outcome = project.compile_basic().unwrap();
    assert_eq!(outcome, UnitOutcome::Compiled { passthrough: true });

    let artifact = project.artifact("release", "basic.frag.spv");
    assert_eq!(std::fs::read_to_string(&artifact).unwrap(), FRAG);
    let manifest = project.manifest().unwrap();
    assert!(manifest.entries.values().all(|e| e.passthrough));

    let warnings = WARNINGS.lock().unwrap_or_else(|e| e.into_inner());
    assert!(warnings
        .iter()
        .any(|w| w.contains("no shader compiler found")));
}

#[test]
fn glslang_is_used_when_glslc_is_absent() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslangValidator", FAKE_GLSLC);

    let outcome = project.compile_basic().unwrap();
    assert_eq!(outcome, UnitOutcome::Compiled { passthrough: false });
    let manifest = project.manifest().unwrap();
    let entry = manifest.entries.values().next().unwrap();
    assert_eq!(entry.tool.as_deref(), Some("glslangValidator"));
}

#[test]
fn corrupt_cache_file_is_rebuilt() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);
    std::fs::create_dir_all(project.path("cache")).unwrap();
    std::fs::write(project.path("cache/cache.json"), "{\"format_version\": 1, \"entr").unwrap();

    let outcome = project.compile_basic().unwrap();
    assert!(matches!(outcome, UnitOutcome::Compiled { .. }));
    assert_eq!(project.manifest().unwrap().entries.len(), 1);
}

#[test]
fn earlier_entries_survive_a_later_failure() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);
    project.write_source("zz_broken.vert", "BROKEN\n");
    project.write_source("zz_broken.frag", FRAG);

    let mut orchestrator = project.orchestrator(Duration::from_secs(10));
    let report = orchestrator.compile_all(Variant::Release).unwrap();
    assert!(!report.success());

    let reopened = FileCacheStore::open(&project.path("cache")).unwrap();
    assert_eq!(reopened.len(), 1);
}

#[test]
fn plain_build_after_defines_build_recompiles() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);
    let lights: Defines = [("MAX_LIGHTS", "8")].into_iter().collect();

    project.compile_basic().unwrap();
    project.compile_basic_with(&lights).unwrap();
    assert_eq!(
        project.artifact_header("basic.frag.spv"),
        "SPIRV DEFS: MAX_LIGHTS=8 VARIANT=RELEASE"
    );

    let outcome = project.compile_basic().unwrap();
    assert!(matches!(outcome, UnitOutcome::Compiled { .. }));
    assert_eq!(
        project.artifact_header("basic.frag.spv"),
        "SPIRV DEFS: VARIANT=RELEASE"
    );
    assert_eq!(project.invocations().len(), 6);

    assert_eq!(project.compile_basic().unwrap(), UnitOutcome::CacheHit);
    assert_eq!(project.invocations().len(), 6);
}

#[test]
fn reverted_edit_recompiles() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);
    let edited = FRAG.replace("1.0", "0.25");

    project.compile_basic().unwrap();
    project.write_source("basic.frag", &edited);
    project.compile_basic().unwrap();
    project.write_source("basic.frag", FRAG);

    let outcome = project.compile_basic().unwrap();
    assert!(matches!(outcome, UnitOutcome::Compiled { .. }));
    let artifact = std::fs::read_to_string(project.artifact("release", "basic.frag.spv")).unwrap();
    assert_eq!(artifact, format!("SPIRV DEFS: VARIANT=RELEASE\n{FRAG}"));
}

#[test]
fn vertex_overwritten_by_failed_build_is_not_served() {
    let _guard = serial();
    let project = Project::with_basic();
    project.install_tool("glslc", FAKE_GLSLC);
    let new_vert = VERT.replace("0.0", "0.5");

    project.compile_basic().unwrap();
    project.write_source("basic.vert", &new_vert);
    project.write_source("basic.frag", "BROKEN\n");
    project.compile_basic().unwrap_err();

    project.write_source("basic.vert", VERT);
    project.write_source("basic.frag", FRAG);
    let outcome = project.compile_basic().unwrap();
    assert!(matches!(outcome, UnitOutcome::Compiled { .. }));
    let artifact = std::fs::read_to_string(project.artifact("release", "basic.vert.spv")).unwrap();
    assert!(artifact.ends_with(VERT));
}
