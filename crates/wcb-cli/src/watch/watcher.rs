//! Filesystem watcher with per-path debouncing.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{CliError, Result};

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    fn from_event(kind: &EventKind, path: &Path) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path.to_path_buf())),
            EventKind::Modify(_) => Some(FileChange::Modified(path.to_path_buf())),
            EventKind::Remove(_) => Some(FileChange::Removed(path.to_path_buf())),
            _ => None,
        }
    }
}

/// Drops events for the path seen last if they arrive inside the window.
///
/// Events for other paths always pass; there is no cross-path coalescing.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<(PathBuf, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// True when an event for `path` at `now` should be delivered.
    pub fn accept(&mut self, path: &Path, now: Instant) -> bool {
        if let Some((last_path, last_time)) = &self.last {
            if last_path == path && now.duration_since(*last_time) < self.window {
                return false;
            }
        }
        self.last = Some((path.to_path_buf(), now));
        true
    }
}

/// Watches a set of directories (non-recursively) and sends change events
/// through a channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    dirs: Vec<PathBuf>,
}

impl FileWatcher {
    /// Start watching `dirs`.
    ///
    /// Returns the watcher, which must be kept alive, and the event receiver.
    pub fn new(
        dirs: Vec<PathBuf>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if let Some(missing) = dirs.iter().find(|d| !d.is_dir()) {
            return Err(CliError::FileNotFound(missing.clone()));
        }

        let (tx, rx) = mpsc::channel(100);
        let mut debouncer = Debouncer::new(Duration::from_millis(debounce_ms));

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("watch error: {e}");
                    return;
                }
            };

            for path in &event.paths {
                if is_hidden(path) {
                    continue;
                }
                let Some(change) = FileChange::from_event(&event.kind, path) else {
                    continue;
                };
                if !debouncer.accept(path, Instant::now()) {
                    continue;
                }
                // The receiver is gone once the watch loop exits.
                let _ = tx.blocking_send(change);
            }
        })?;

        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            tracing::debug!(dir = %dir.display(), "watching");
        }

        Ok((
            Self {
                _watcher: watcher,
                dirs,
            },
            rx,
        ))
    }

    /// Directories being watched.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Editor swap files, dotfiles and our own staging files.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with('.') || name.ends_with('~'))
}
