//! File watching for stylesheet recompilation.

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebouncedEvent, DebouncedEventKind, Debouncer, new_debouncer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::{Error, Result};

type EventBatch = std::result::Result<Vec<DebouncedEvent>, notify::Error>;

/// Event indicating a stylesheet file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetChangeEvent {
    /// Path to the changed file.
    pub path: PathBuf,
    /// Type of change.
    pub kind: ChangeKind,
}

/// Type of file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// File was written or replaced.
    Modified,
    /// File was removed.
    Removed,
}

/// Watches stylesheet files and reports debounced changes.
///
/// Each file's parent directory is watched rather than the file itself, so
/// editors that save by replacing the file keep being noticed.
///
/// # Example
///
/// ```no_run
/// use rtb_style::Stylesheet;
/// use rtb_style::watch::StylesheetWatcher;
///
/// let mut watcher = StylesheetWatcher::new()?;
/// watcher.watch("theme.css")?;
///
/// loop {
///     let changes = watcher.wait();
///     watcher.apply_changes(&changes, |path| Stylesheet::from_file(path).map(drop));
/// }
/// # Ok::<(), rtb_style::Error>(())
/// ```
pub struct StylesheetWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<EventBatch>,
    watched_paths: HashSet<PathBuf>,
    watched_dirs: HashSet<PathBuf>,
}

impl StylesheetWatcher {
    /// Debounce window for file events.
    pub const DEBOUNCE: Duration = Duration::from_millis(100);

    /// Create a new stylesheet watcher.
    pub fn new() -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let debouncer =
            new_debouncer(Self::DEBOUNCE, tx).map_err(|e| Error::Watch(e.to_string()))?;

        Ok(Self {
            debouncer,
            rx,
            watched_paths: HashSet::new(),
            watched_dirs: HashSet::new(),
        })
    }

    /// Start watching a stylesheet file.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path
            .as_ref()
            .canonicalize()
            .map_err(|e| Error::io(path.as_ref(), e))?;

        if self.watched_paths.contains(&path) {
            return Ok(());
        }

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if !self.watched_dirs.contains(&dir) {
            self.debouncer
                .watcher()
                .watch(&dir, RecursiveMode::NonRecursive)
                .map_err(|e| Error::Watch(e.to_string()))?;
            self.watched_dirs.insert(dir);
        }

        tracing::info!("Watching stylesheet: {}", path.display());
        self.watched_paths.insert(path);
        Ok(())
    }

    /// Stop watching a stylesheet file.
    pub fn unwatch(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = match path.as_ref().canonicalize() {
            Ok(p) => p,
            Err(_) => return Ok(()), // File doesn't exist, nothing to unwatch
        };

        if !self.watched_paths.remove(&path) {
            return Ok(());
        }
        tracing::info!("Stopped watching stylesheet: {}", path.display());

        if let Some(dir) = path.parent() {
            let still_used = self.watched_paths.iter().any(|p| p.parent() == Some(dir));
            if !still_used && self.watched_dirs.remove(dir) {
                let _ = self.debouncer.watcher().unwatch(dir);
            }
        }

        Ok(())
    }

    /// Collect pending changes without blocking.
    pub fn poll(&mut self) -> Vec<StylesheetChangeEvent> {
        let mut changes = vec![];

        loop {
            match self.rx.try_recv() {
                Ok(batch) => self.collect(batch, &mut changes),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!("File watcher disconnected");
                    break;
                }
            }
        }

        dedup(changes)
    }

    /// Block until at least one watched file changes.
    ///
    /// Returns an empty list only if the underlying watcher shut down.
    pub fn wait(&mut self) -> Vec<StylesheetChangeEvent> {
        loop {
            let mut changes = vec![];
            match self.rx.recv() {
                Ok(batch) => self.collect(batch, &mut changes),
                Err(_) => {
                    tracing::error!("File watcher disconnected");
                    return changes;
                }
            }

            // Pick up anything that arrived in the same burst
            while let Ok(batch) = self.rx.recv_timeout(Self::DEBOUNCE) {
                self.collect(batch, &mut changes);
            }

            let changes = dedup(changes);
            if !changes.is_empty() {
                return changes;
            }
        }
    }

    /// Wait up to `timeout` for changes.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Vec<StylesheetChangeEvent> {
        let mut changes = vec![];
        match self.rx.recv_timeout(timeout) {
            Ok(batch) => self.collect(batch, &mut changes),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                tracing::error!("File watcher disconnected");
            }
        }
        changes.extend(self.poll());
        dedup(changes)
    }

    /// Run `compile` for every modified stylesheet.
    ///
    /// Failures are logged and do not stop the remaining recompiles. Returns
    /// how many succeeded.
    pub fn apply_changes<F>(&self, changes: &[StylesheetChangeEvent], mut compile: F) -> usize
    where
        F: FnMut(&Path) -> Result<()>,
    {
        let mut compiled = 0;

        for change in changes {
            match change.kind {
                ChangeKind::Modified => {
                    tracing::info!("Recompiling stylesheet: {}", change.path.display());
                    match compile(&change.path) {
                        Ok(()) => compiled += 1,
                        Err(e) => {
                            tracing::error!(
                                "Failed to recompile stylesheet {}: {}",
                                change.path.display(),
                                e
                            );
                        }
                    }
                }
                ChangeKind::Removed => {
                    tracing::warn!("Stylesheet removed: {}", change.path.display());
                }
            }
        }

        compiled
    }

    /// Get the number of watched files.
    pub fn watched_count(&self) -> usize {
        self.watched_paths.len()
    }

    /// Get the watched paths.
    pub fn watched_paths(&self) -> impl Iterator<Item = &Path> {
        self.watched_paths.iter().map(|p| p.as_path())
    }

    fn collect(&self, batch: EventBatch, changes: &mut Vec<StylesheetChangeEvent>) {
        match batch {
            Ok(events) => {
                for event in events {
                    if event.kind != DebouncedEventKind::Any {
                        continue;
                    }

                    // Only report changes for files we're watching
                    if self.watched_paths.contains(&event.path) {
                        let kind = if event.path.exists() {
                            ChangeKind::Modified
                        } else {
                            ChangeKind::Removed
                        };
                        changes.push(StylesheetChangeEvent {
                            path: event.path,
                            kind,
                        });
                    }
                }
            }
            Err(e) => tracing::warn!("File watcher error: {}", e),
        }
    }
}

fn dedup(mut changes: Vec<StylesheetChangeEvent>) -> Vec<StylesheetChangeEvent> {
    // Same file may have multiple events; the last one wins
    changes.reverse();
    let mut seen = HashSet::new();
    changes.retain(|c| seen.insert(c.path.clone()));
    changes.reverse();
    changes
}
