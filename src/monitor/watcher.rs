//! Settings file watcher.
//!
//! The notify callback runs on the watcher's own thread and only forwards
//! [`FileEvent`]s into a channel. Whoever owns the receiver feeds them to
//! [`crate::store::ConfigStore::on_file_event`], so re-registering a watch
//! never happens from inside the callback.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// A change to a watched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    /// The file was deleted or replaced; its watch is gone.
    pub removed: bool,
}

/// Watches individual files and reports changes.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    files: BTreeSet<PathBuf>,
}

impl FileWatcher {
    /// Create a new FileWatcher.
    ///
    /// Returns the watcher and a receiver of file events. `poll_interval`
    /// only applies where notify falls back to polling.
    pub fn new(
        poll_interval: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FileEvent>), notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if is_change(&event.kind) {
                        let removed = event.kind.is_remove();
                        for path in event.paths {
                            tracing::trace!(
                                path = ?path,
                                kind = ?event.kind,
                                "Settings file event"
                            );
                            let _ = tx.send(FileEvent { path, removed });
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(poll_interval),
        )?;

        Ok((
            Self {
                watcher,
                files: BTreeSet::new(),
            },
            rx,
        ))
    }

    /// Paths currently registered.
    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    /// Starts watching `path`. Watching an already watched path is a no-op.
    pub fn watch(&mut self, path: &Path) -> Result<(), notify::Error> {
        if self.files.contains(path) {
            return Ok(());
        }
        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        self.files.insert(path.to_path_buf());
        tracing::debug!(path = ?path, "Watching settings file");
        Ok(())
    }

    /// Drops `path` from the watch list. The OS may already have released
    /// the watch (file deleted), so unwatch failures are ignored.
    pub fn forget(&mut self, path: &Path) {
        if self.files.remove(path) {
            if let Err(e) = self.watcher.unwatch(path) {
                tracing::trace!(path = ?path, error = %e, "Unwatch of stale path ignored");
            }
        }
    }
}

/// Content changes, creations and removals; access events are ignored.
fn is_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create() || kind.is_remove()
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher").field("files", &self.files).finish()
    }
}
