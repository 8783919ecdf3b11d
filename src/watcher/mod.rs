pub mod event;

use std::path::Path;
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use tokio::sync::mpsc as tokio_mpsc;
use tokio::task::JoinHandle;

use crate::error::WatchError;
use crate::pattern::{WatchPattern, relative_path};

use event::{ChangeEvent, ChangeKind};

/// Capacity of the channel between the watcher thread and the event loop.
const CHANNEL_CAPACITY: usize = 256;

/// Handle to a running watcher. Keeps the debouncer alive (dropping stops watching).
pub struct WatcherHandle {
    /// Keep alive: dropping the debouncer stops the OS watcher.
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
    /// The bridge task forwarding events from std channel to tokio channel.
    _bridge_task: JoinHandle<()>,
}

/// Start a debounced recursive watcher on `watch_root`.
///
/// Returns a `WatcherHandle` (must be kept alive) and a receiver yielding one
/// `ChangeEvent` per debounced path that matches `pattern`. Watcher failures are
/// forwarded as `Err` so the consumer can stop.
///
/// `watch_root` should be canonical: the OS reports canonical paths on some
/// platforms and relative paths are computed by prefix stripping.
pub fn start_watcher(
    watch_root: &Path,
    pattern: WatchPattern,
    debounce: Duration,
) -> Result<
    (
        WatcherHandle,
        tokio_mpsc::Receiver<Result<ChangeEvent, WatchError>>,
    ),
    WatchError,
> {
    let (std_tx, std_rx) = std::sync::mpsc::channel::<DebounceEventResult>();

    let mut debouncer = new_debouncer(debounce, move |res| {
        let _ = std_tx.send(res);
    })?;
    debouncer
        .watcher()
        .watch(watch_root, RecursiveMode::Recursive)?;

    let (tokio_tx, tokio_rx) = tokio_mpsc::channel(CHANNEL_CAPACITY);

    // Bridge: spawn_blocking to receive from std channel, classify, forward to tokio
    let root = watch_root.to_path_buf();
    let bridge_task = tokio::task::spawn_blocking(move || {
        while let Ok(result) = std_rx.recv() {
            match result {
                Ok(events) => {
                    for debounced_event in events {
                        let Some(change) = classify_event(&debounced_event.path, &root, &pattern)
                        else {
                            tracing::trace!(path = %debounced_event.path.display(), "ignored");
                            continue;
                        };
                        if tokio_tx.blocking_send(Ok(change)).is_err() {
                            return; // receiver dropped, shutdown
                        }
                    }
                }
                Err(err) => {
                    if tokio_tx.blocking_send(Err(WatchError::from(err))).is_err() {
                        return;
                    }
                }
            }
        }
    });

    Ok((
        WatcherHandle {
            _debouncer: debouncer,
            _bridge_task: bridge_task,
        },
        tokio_rx,
    ))
}

/// Classify a filesystem event path into a `ChangeEvent`, or None if it does not
/// match the watch pattern.
fn classify_event(path: &Path, root: &Path, pattern: &WatchPattern) -> Option<ChangeEvent> {
    let rel = relative_path(path, root);
    let matched = pattern.matched(&rel)?;

    let kind = if path.exists() {
        ChangeKind::Modified
    } else {
        ChangeKind::Removed
    };

    Some(ChangeEvent {
        path: matched.to_string(),
        kind,
    })
}
