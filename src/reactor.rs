use std::io::Write;

use crate::error::WatchError;
use crate::output::{OutputMode, SessionEvent, emit};
use crate::pattern::ExclusionFilter;
use crate::runner::{RunOutcome, TestRunner};
use crate::watcher::event::ChangeEvent;

/// What the reactor did with one change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// The path hit the exclusion filter; nothing was printed or run.
    Skipped,
    /// The change was announced and the test command ran once.
    Ran { path: String, outcome: RunOutcome },
}

/// Bridges matched filesystem changes to test runs.
///
/// Stateless: each call announces the change, runs the tests to completion and
/// returns. Callers must not invoke it concurrently if they want runs to stay
/// sequential; the event loop in `main` awaits each call before the next.
pub struct ChangeReactor<R: TestRunner> {
    runner: R,
    exclusion: ExclusionFilter,
    mode: OutputMode,
}

impl<R: TestRunner> ChangeReactor<R> {
    pub fn new(runner: R, exclusion: ExclusionFilter, mode: OutputMode) -> Self {
        Self {
            runner,
            exclusion,
            mode,
        }
    }

    /// Handle one change whose path already matched the watch pattern.
    ///
    /// Excluded paths return `Reaction::Skipped` with no output. Otherwise the
    /// change line goes to `out`, then the runner blocks until the suite finishes.
    /// A failing suite is reported in the returned outcome; only a launch
    /// failure or an output error is an `Err`.
    pub fn on_path_matched(
        &self,
        event: &ChangeEvent,
        out: &mut dyn Write,
    ) -> Result<Reaction, WatchError> {
        if self.exclusion.is_excluded(&event.path) {
            tracing::debug!(path = %event.path, "excluded");
            return Ok(Reaction::Skipped);
        }

        emit(
            out,
            self.mode,
            &SessionEvent::ChangeDetected {
                path: &event.path,
                kind: event.kind,
            },
        )?;

        let outcome = self.runner.run()?;
        let elapsed_ms = u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX);

        if outcome.success {
            tracing::info!(path = %event.path, elapsed_ms, "tests passed");
        } else {
            match outcome.code {
                Some(code) => {
                    tracing::warn!(path = %event.path, code, elapsed_ms, "tests failed")
                }
                None => {
                    tracing::warn!(path = %event.path, elapsed_ms, "test command killed by signal")
                }
            }
        }

        emit(
            out,
            self.mode,
            &SessionEvent::TestsFinished {
                path: &event.path,
                success: outcome.success,
                code: outcome.code,
                elapsed_ms,
            },
        )?;

        Ok(Reaction::Ran {
            path: event.path.clone(),
            outcome,
        })
    }
}
