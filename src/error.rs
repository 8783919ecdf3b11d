use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the watch loop.
///
/// A test command that runs and exits non-zero is not an error; it is reported
/// through [`crate::runner::RunOutcome`] instead.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The watch pattern is not a valid regular expression.
    #[error("invalid watch pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The configured test command has no program to run.
    #[error("test command is empty")]
    EmptyCommand,

    /// The test command could not be launched (missing binary, permissions, ...).
    #[error("failed to launch test command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The OS-level watcher could not be created or reported a failure.
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// Writing session output to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// The watch root does not exist or is not a directory.
    #[error("watch root not found: {path}")]
    RootNotFound { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_names_program() {
        let err = WatchError::Spawn {
            program: "python".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("'python'"), "got: {msg}");
        assert!(msg.contains("not found"), "got: {msg}");
    }

    #[test]
    fn test_invalid_pattern_mentions_pattern() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = WatchError::InvalidPattern {
            pattern: "(unclosed".to_string(),
            source,
        };
        assert!(err.to_string().contains("'(unclosed'"));
    }
}
