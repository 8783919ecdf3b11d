use std::io::{self, Write};

use serde::Serialize;

use crate::watcher::event::ChangeKind;

/// How session events are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One `Change detected in <path> …` line per triggering change.
    #[default]
    Human,
    /// One JSON object per line for every session event.
    Json,
}

/// Events of a watch session, serialised as NDJSON in [`OutputMode::Json`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent<'a> {
    WatchStarted {
        root: String,
        pattern: &'a str,
    },
    ChangeDetected {
        path: &'a str,
        kind: ChangeKind,
    },
    TestsFinished {
        path: &'a str,
        success: bool,
        code: Option<i32>,
        elapsed_ms: u64,
    },
    Shutdown,
}

/// Write `event` to `out` according to `mode`.
///
/// Human mode prints only [`SessionEvent::ChangeDetected`]; everything else
/// goes through the log.
pub fn emit(out: &mut dyn Write, mode: OutputMode, event: &SessionEvent<'_>) -> io::Result<()> {
    match mode {
        OutputMode::Human => {
            if let SessionEvent::ChangeDetected { path, .. } = event {
                writeln!(out, "Change detected in {path} …")?;
            }
        }
        OutputMode::Json => {
            let line = serde_json::to_string(event).map_err(io::Error::other)?;
            writeln!(out, "{line}")?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(mode: OutputMode, event: &SessionEvent<'_>) -> String {
        let mut buf = Vec::new();
        emit(&mut buf, mode, event).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_human_change_line() {
        let out = render(
            OutputMode::Human,
            &SessionEvent::ChangeDetected {
                path: "tests/test_foo.py",
                kind: ChangeKind::Modified,
            },
        );
        assert_eq!(out, "Change detected in tests/test_foo.py …\n");
    }

    #[test]
    fn test_human_mode_is_silent_for_other_events() {
        let out = render(
            OutputMode::Human,
            &SessionEvent::TestsFinished {
                path: "tests/test_foo.py",
                success: false,
                code: Some(1),
                elapsed_ms: 12,
            },
        );
        assert!(out.is_empty());
        assert!(render(OutputMode::Human, &SessionEvent::Shutdown).is_empty());
    }

    #[test]
    fn test_json_change_event() {
        let out = render(
            OutputMode::Json,
            &SessionEvent::ChangeDetected {
                path: "twentiment/core.py",
                kind: ChangeKind::Removed,
            },
        );
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["event"], "change_detected");
        assert_eq!(value["path"], "twentiment/core.py");
        assert_eq!(value["kind"], "removed");
    }

    #[test]
    fn test_json_tests_finished_event() {
        let out = render(
            OutputMode::Json,
            &SessionEvent::TestsFinished {
                path: "tests/test_foo.py",
                success: true,
                code: Some(0),
                elapsed_ms: 340,
            },
        );
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["event"], "tests_finished");
        assert_eq!(value["success"], true);
        assert_eq!(value["code"], 0);
        assert_eq!(value["elapsed_ms"], 340);
    }
}
