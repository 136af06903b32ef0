//! The `shade` command-line interface for the incremental shader cache.
//!
//! Provides `shade compile` for building one named vertex/fragment unit and
//! `shade all` for building every unit found in the source directory.

#![warn(missing_docs)]

mod compile;
mod pipeline;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use shade_common::{Defines, Variant};

/// Compiles shader pairs and skips the ones that have not changed.
#[derive(Parser, Debug)]
#[command(name = "shade", version, about = "Incremental shader compiler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `shade.toml` file, or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the source directory from the configuration.
    #[arg(long, global = true)]
    pub source_dir: Option<PathBuf>,

    /// Override the output directory from the configuration.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Override the cache directory from the configuration.
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Fail units instead of copying sources when no compiler is found.
    #[arg(long, global = true)]
    pub strict: bool,

    /// The subcommand to run. Defaults to `all --variant release`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile one named unit.
    Compile(CompileArgs),
    /// Compile every unit in the source directory.
    All(AllArgs),
}

/// Arguments for the `shade compile` subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Unit name: the shared stem of `<name>.vert` and `<name>.frag`.
    pub name: String,

    /// Build variant.
    #[arg(long, value_enum, default_value_t = CliVariant::Release)]
    pub variant: CliVariant,

    /// Extra preprocessor define (`NAME=VALUE`, or `NAME` for `NAME=1`).
    #[arg(
        short = 'D',
        long = "define",
        value_name = "NAME=VALUE",
        value_parser = Defines::parse_pair
    )]
    pub defines: Vec<(String, String)>,
}

/// Arguments for the `shade all` subcommand.
#[derive(Args, Debug)]
pub struct AllArgs {
    /// Build variant.
    #[arg(long, value_enum, default_value_t = CliVariant::Release)]
    pub variant: CliVariant,
}

/// Build variant selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliVariant {
    /// Debug build (`VARIANT=DEBUG`).
    Debug,
    /// Release build (`VARIANT=RELEASE`).
    Release,
}

impl From<CliVariant> for Variant {
    fn from(v: CliVariant) -> Self {
        match v {
            CliVariant::Debug => Variant::Debug,
            CliVariant::Release => Variant::Release,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Optional path to a custom config file or directory.
    pub config: Option<PathBuf>,
    /// Source directory override.
    pub source_dir: Option<PathBuf>,
    /// Output directory override.
    pub output_dir: Option<PathBuf>,
    /// Cache directory override.
    pub cache_dir: Option<PathBuf>,
    /// Strict mode override (only ever turns strict mode on).
    pub strict: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
        source_dir: cli.source_dir,
        output_dir: cli.output_dir,
        cache_dir: cli.cache_dir,
        strict: cli.strict,
    };

    let result = match cli.command {
        Some(Command::Compile(ref args)) => compile::run_one(args, &global),
        Some(Command::All(ref args)) => compile::run_all(args.variant.into(), &global),
        None => compile::run_all(Variant::Release, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs `env_logger`. `RUST_LOG` takes precedence over the flags.
fn init_logging(quiet: bool, verbose: bool) {
    let env = env_logger::Env::default().default_filter_or(log_level(quiet, verbose));
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}
