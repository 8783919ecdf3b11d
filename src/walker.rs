use std::path::Path;

use crate::pattern::{ExclusionFilter, WatchPattern, relative_path};

/// Walk `root` and collect the paths that would currently trigger a test run.
///
/// Respects `.gitignore` rules (even outside a git repository). Each entry is
/// the matched portion of the root-relative path, exactly as the watcher would
/// report it, and excluded entries are dropped. The result is sorted.
pub fn list_matches(
    root: &Path,
    pattern: &WatchPattern,
    exclusion: &ExclusionFilter,
) -> anyhow::Result<Vec<String>> {
    let mut matches = Vec::new();

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        .require_git(false)
        .build();

    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("{err}");
                continue;
            }
        };

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        let rel = relative_path(entry.path(), root);
        let Some(matched) = pattern.matched(&rel) else {
            continue;
        };

        if exclusion.is_excluded(matched) {
            tracing::debug!(path = %rel, "excluded");
            continue;
        }

        matches.push(matched.to_string());
    }

    matches.sort();
    matches.dedup();
    Ok(matches)
}
