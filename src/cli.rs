use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;

/// Re-run a Python project's test suite whenever a test or module file changes.
///
/// watchtest watches the project tree, and for every changed file under `tests/`
/// or `twentiment/` ending in `.py` prints `Change detected in <path> …` and runs
/// `python -m unittest`. Files inside `__pycache__` never trigger a run.
#[derive(Parser, Debug)]
#[command(
    name = "watchtest",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the project and re-run the tests on every matching change (default).
    Watch(WatchArgs),

    /// Print the files that would currently trigger a test run, one per line.
    List(PatternArgs),
}

/// Project root and path selection shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct PatternArgs {
    /// Path to the project root.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Regular expression selecting the paths that trigger a test run.
    #[arg(long)]
    pub pattern: Option<String>,

    /// Substring that suppresses a test run (repeatable; replaces the default `__pycache__`).
    #[arg(long = "exclude", value_name = "SUBSTRING")]
    pub exclude: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub select: PatternArgs,

    /// Debounce interval for filesystem notifications, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Show the test command's output instead of discarding it.
    #[arg(long)]
    pub passthrough: bool,

    /// Emit NDJSON session events on stdout instead of human-readable lines.
    #[arg(long)]
    pub json: bool,

    /// Test command to run instead of `python -m unittest`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl WatchArgs {
    /// Arguments equivalent to running `watchtest` with no subcommand.
    pub fn current_dir() -> Self {
        Self {
            select: PatternArgs::current_dir(),
            debounce_ms: None,
            passthrough: false,
            json: false,
            command: Vec::new(),
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            debounce_ms: self.debounce_ms,
            passthrough: self.passthrough,
            command: self.command.clone(),
            ..self.select.overrides()
        }
    }
}

impl PatternArgs {
    pub fn current_dir() -> Self {
        Self {
            path: PathBuf::from("."),
            pattern: None,
            exclude: Vec::new(),
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            pattern: self.pattern.clone(),
            exclude: self.exclude.clone(),
            ..Overrides::default()
        }
    }
}
