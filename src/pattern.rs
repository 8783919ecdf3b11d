use std::path::{Component, Path};

use regex::Regex;

use crate::error::WatchError;

/// Paths that trigger a test run: anything under `tests/` or `twentiment/` ending in `.py`.
pub const DEFAULT_PATTERN: &str = r"(tests/.*\.py)|(twentiment/.*\.py)";

/// Substrings that suppress a test run even when the pattern matched.
pub const DEFAULT_EXCLUDE: &[&str] = &["__pycache__"];

/// Compiled watch pattern.
///
/// Matching is unanchored and yields the matched slice of the path rather than
/// the whole path, so `pkg/tests/test_a.py` reports as `tests/test_a.py`. The
/// same unanchored search also accepts `.pyc` files (the `.py` prefix of the
/// extension matches), which is why [`ExclusionFilter`] exists.
#[derive(Debug, Clone)]
pub struct WatchPattern {
    regex: Regex,
}

impl WatchPattern {
    pub fn new(pattern: &str) -> Result<Self, WatchError> {
        let regex = Regex::new(pattern).map_err(|source| WatchError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// Return the portion of `path` matched by the pattern, if any.
    pub fn matched<'a>(&self, path: &'a str) -> Option<&'a str> {
        self.regex.find(path).map(|m| m.as_str())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Substring-based exclusion applied by the reactor before it runs anything.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    needles: Vec<String>,
}

impl ExclusionFilter {
    pub fn new(needles: Vec<String>) -> Self {
        Self { needles }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.needles
            .iter()
            .any(|needle| !needle.is_empty() && path.contains(needle.as_str()))
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect())
    }
}

/// Render `path` relative to `root` with `/` separators.
///
/// Falls back to the full path when `path` lies outside `root`.
pub fn relative_path(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}
