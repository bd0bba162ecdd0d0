use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

/// Events emitted by the snapshot watcher
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// One or more snapshot files changed, time to compare again
    FilesChanged(Vec<PathBuf>),
}

/// A debounced watcher over one or more snapshot directories
pub struct SnapshotWatcher {
    _debouncer: notify_debouncer_mini::Debouncer<RecommendedWatcher>,
}

impl SnapshotWatcher {
    /// Start watching `roots` recursively. Changes are batched over
    /// `debounce_ms` milliseconds and sent to `tx`.
    pub fn new(roots: &[&Path], debounce_ms: u64, tx: mpsc::Sender<WatchEvent>) -> Result<Self> {
        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |result: std::result::Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(events) => {
                    let paths = changed_paths(&events);
                    if !paths.is_empty() {
                        // Receiver gone means the watch loop has exited
                        let _ = tx.send(WatchEvent::FilesChanged(paths));
                    }
                }
                Err(e) => log::warn!("Snapshot watcher error: {}", e),
            },
        )?;

        for root in roots {
            debouncer
                .watcher()
                .watch(root, RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch {}", root.display()))?;
            log::info!("Watching {}", root.display());
        }

        Ok(SnapshotWatcher {
            _debouncer: debouncer,
        })
    }
}

/// Paths worth a new comparison: settled changes, minus editor swap and
/// backup files.
fn changed_paths(events: &[DebouncedEvent]) -> Vec<PathBuf> {
    events
        .iter()
        .filter(|e| should_recompare(&e.kind, &e.path))
        .map(|e| e.path.clone())
        .collect()
}

fn should_recompare(kind: &DebouncedEventKind, path: &Path) -> bool {
    *kind == DebouncedEventKind::Any && !is_scratch_file(path)
}

fn is_scratch_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with('~') || name.ends_with(".swp") || name.ends_with(".tmp") || name.starts_with(".#")
}
