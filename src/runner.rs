use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::WatchError;

/// Result of one completed test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub elapsed: Duration,
}

impl RunOutcome {
    fn from_status(status: ExitStatus, elapsed: Duration) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
            elapsed,
        }
    }
}

/// Runs the project's test suite. Implementations block until the run finishes.
pub trait TestRunner: Send + Sync {
    fn run(&self) -> Result<RunOutcome, WatchError>;
}

/// Runs an external command in the project root.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
    passthrough: bool,
}

impl CommandRunner {
    /// Build a runner from `[program, args...]`.
    ///
    /// With `passthrough` the child inherits stdio; otherwise its output is
    /// captured and dropped.
    pub fn new(command: &[String], cwd: PathBuf, passthrough: bool) -> Result<Self, WatchError> {
        let (program, args) = command.split_first().ok_or(WatchError::EmptyCommand)?;
        if program.is_empty() {
            return Err(WatchError::EmptyCommand);
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd,
            passthrough,
        })
    }

    /// Human-readable command line, used in log messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> WatchError {
        WatchError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl TestRunner for CommandRunner {
    fn run(&self) -> Result<RunOutcome, WatchError> {
        let started = Instant::now();
        tracing::debug!(command = %self.display(), cwd = %self.cwd.display(), "running tests");

        let status = if self.passthrough {
            self.command()
                .status()
                .map_err(|e| self.spawn_error(e))?
        } else {
            let output = self
                .command()
                .stdin(Stdio::null())
                .output()
                .map_err(|e| self.spawn_error(e))?;
            tracing::trace!(
                stdout_bytes = output.stdout.len(),
                stderr_bytes = output.stderr.len(),
                "discarded test output"
            );
            output.status
        };

        Ok(RunOutcome::from_status(status, started.elapsed()))
    }
}
