use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::pattern::{DEFAULT_EXCLUDE, DEFAULT_PATTERN};

/// Name of the optional configuration file at the project root.
pub const CONFIG_FILE: &str = "watchtest.toml";

/// Test command used when neither the config file nor the CLI sets one.
pub const DEFAULT_COMMAND: &[&str] = &["python", "-m", "unittest"];

/// Debounce interval for filesystem notifications.
pub const DEFAULT_DEBOUNCE_MS: u64 = 75;

/// Configuration loaded from `watchtest.toml` at the project root.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WatchtestConfig {
    /// Regular expression selecting the paths that trigger a test run.
    pub pattern: Option<String>,
    /// Substrings that suppress a test run (replaces the default `__pycache__`).
    pub exclude: Option<Vec<String>>,
    /// Test command as program followed by arguments.
    pub command: Option<Vec<String>>,
    /// Debounce interval in milliseconds.
    pub debounce_ms: Option<u64>,
    /// Let the test command write to the terminal instead of discarding its output.
    pub passthrough: Option<bool>,
}

impl WatchtestConfig {
    /// Load configuration from `watchtest.toml` in the given root directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}

/// Values given on the command line. `None`/empty means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub pattern: Option<String>,
    pub exclude: Vec<String>,
    pub command: Vec<String>,
    pub debounce_ms: Option<u64>,
    pub passthrough: bool,
}

/// Fully resolved settings for one watch session.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub root: PathBuf,
    pub pattern: String,
    pub exclude: Vec<String>,
    pub command: Vec<String>,
    pub debounce: Duration,
    pub passthrough: bool,
}

impl WatchSettings {
    /// Merge defaults, the config file, and CLI overrides, in increasing precedence.
    pub fn resolve(root: PathBuf, file: WatchtestConfig, overrides: Overrides) -> Self {
        let pattern = overrides
            .pattern
            .or(file.pattern)
            .unwrap_or_else(|| DEFAULT_PATTERN.to_string());

        let exclude = if !overrides.exclude.is_empty() {
            overrides.exclude
        } else {
            file.exclude
                .unwrap_or_else(|| DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect())
        };

        let command = if !overrides.command.is_empty() {
            overrides.command
        } else {
            file.command
                .unwrap_or_else(|| DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect())
        };

        let debounce_ms = overrides
            .debounce_ms
            .or(file.debounce_ms)
            .unwrap_or(DEFAULT_DEBOUNCE_MS);

        Self {
            root,
            pattern,
            exclude,
            command,
            debounce: Duration::from_millis(debounce_ms),
            passthrough: overrides.passthrough || file.passthrough.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tmp();
        assert_eq!(WatchtestConfig::load(dir.path()), WatchtestConfig::default());
    }

    #[test]
    fn test_load_reads_all_keys() {
        let dir = tmp();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
pattern = 'src/.*\.py'
exclude = ["__pycache__", ".venv"]
command = ["pytest", "-q"]
debounce_ms = 200
passthrough = true
"#,
        )
        .unwrap();

        let config = WatchtestConfig::load(dir.path());
        assert_eq!(config.pattern.as_deref(), Some(r"src/.*\.py"));
        assert_eq!(
            config.exclude,
            Some(vec!["__pycache__".to_string(), ".venv".to_string()])
        );
        assert_eq!(
            config.command,
            Some(vec!["pytest".to_string(), "-q".to_string()])
        );
        assert_eq!(config.debounce_ms, Some(200));
        assert_eq!(config.passthrough, Some(true));
    }

    #[test]
    fn test_load_invalid_toml_falls_back_to_default() {
        let dir = tmp();
        fs::write(dir.path().join(CONFIG_FILE), "pattern = [").unwrap();
        assert_eq!(WatchtestConfig::load(dir.path()), WatchtestConfig::default());
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = WatchSettings::resolve(
            PathBuf::from("."),
            WatchtestConfig::default(),
            Overrides::default(),
        );
        assert_eq!(settings.pattern, DEFAULT_PATTERN);
        assert_eq!(settings.exclude, vec!["__pycache__".to_string()]);
        assert_eq!(settings.command, vec!["python", "-m", "unittest"]);
        assert_eq!(settings.debounce, Duration::from_millis(DEFAULT_DEBOUNCE_MS));
        assert!(!settings.passthrough);
    }

    #[test]
    fn test_resolve_cli_beats_file() {
        let file = WatchtestConfig {
            pattern: Some("file".to_string()),
            exclude: Some(vec!["from-file".to_string()]),
            command: Some(vec!["make".to_string(), "test".to_string()]),
            debounce_ms: Some(500),
            passthrough: Some(false),
        };
        let overrides = Overrides {
            pattern: Some("cli".to_string()),
            exclude: vec!["from-cli".to_string()],
            command: vec!["pytest".to_string()],
            debounce_ms: Some(10),
            passthrough: true,
        };

        let settings = WatchSettings::resolve(PathBuf::from("."), file, overrides);
        assert_eq!(settings.pattern, "cli");
        assert_eq!(settings.exclude, vec!["from-cli".to_string()]);
        assert_eq!(settings.command, vec!["pytest".to_string()]);
        assert_eq!(settings.debounce, Duration::from_millis(10));
        assert!(settings.passthrough);
    }

    #[test]
    fn test_resolve_file_beats_defaults() {
        let file = WatchtestConfig {
            command: Some(vec!["make".to_string(), "test".to_string()]),
            ..Default::default()
        };
        let settings = WatchSettings::resolve(PathBuf::from("."), file, Overrides::default());
        assert_eq!(settings.command, vec!["make", "test"]);
        assert_eq!(settings.pattern, DEFAULT_PATTERN);
    }
}
