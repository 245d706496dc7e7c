//! Consistency monitor.
//!
//! # Data Flow
//! ```text
//! settings file edited externally
//!     → watcher.rs (notify) forwards a FileEvent
//!     → ConsistencyMonitor::on_file_changed
//!         → self-inflicted write? consume skip flag, stop
//!         → check_and_handle_error
//!             → unrecognized-key scan + value-validity scan
//!             → state.rs transition
//!             → events.rs Error / ErrorResolved (transitions only)
//!         → ensure the file exists and is watched
//! ```
//!
//! # Design Decisions
//! - One error flag for the whole store: any inconsistency degrades every
//!   read to its fallback and blocks writes until resolved
//! - Missing file means nothing to validate, hence healthy
//! - The first `has_error` after startup runs a full check
//! - The monitor holds no lock itself; the owning store serializes access

pub mod events;
pub mod state;
pub mod watcher;

use std::collections::BTreeSet;
use std::path::Path;

use crate::backend::{keys_in_group, SettingsBackend, DEFAULT_GROUP};
use crate::error::BackendError;
use crate::observability::metrics;
use crate::registry::HandlerRegistry;

pub use events::{ConfigEvent, EventBus};
pub use state::{ErrorState, MonitorState};
pub use watcher::{FileEvent, FileWatcher};

/// User-facing description of the error state.
pub const ERROR_MESSAGE: &str =
    "The configuration contains an error. Open configuration to resolve.";

/// Owns the error state, the event bus and the file watch.
#[derive(Debug)]
pub struct ConsistencyMonitor {
    state: MonitorState,
    events: EventBus,
    watcher: Option<FileWatcher>,
}

impl ConsistencyMonitor {
    pub fn new(events: EventBus, watcher: Option<FileWatcher>) -> Self {
        Self {
            state: MonitorState::default(),
            events,
            watcher,
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn watcher(&self) -> Option<&FileWatcher> {
        self.watcher.as_ref()
    }

    /// Marks the next file event as caused by our own write.
    pub fn arm_skip(&mut self) {
        self.state.arm_skip();
    }

    /// Drops an armed skip after a write that never reached the file.
    pub fn disarm_skip(&mut self) {
        self.state.take_skip();
    }

    /// Records the error flag, emitting an event only on a transition.
    pub fn set_error_state(&mut self, error: bool) {
        if let Some(event) = self.state.error.set(error) {
            let subscribers = self.events.subscriber_count();
            match event {
                ConfigEvent::Error => {
                    tracing::info!(subscribers, "Settings became inconsistent")
                }
                ConfigEvent::ErrorResolved => {
                    tracing::info!(subscribers, "Settings error resolved")
                }
                ConfigEvent::FileChanged(_) => {}
            }
            self.events.emit(event);
        }
        metrics::record_error_state(error);
    }

    /// Cached error flag, running a full check first if one is pending.
    pub fn has_error<B>(&mut self, backend: &B, registry: &HandlerRegistry) -> bool
    where
        B: SettingsBackend + ?Sized,
    {
        if self.state.error.is_pending() {
            self.check_and_handle_error(backend, registry);
        }
        self.state.error.has_error()
    }

    /// Recomputes the error flag from the current file contents.
    pub fn check_and_handle_error<B>(&mut self, backend: &B, registry: &HandlerRegistry)
    where
        B: SettingsBackend + ?Sized,
    {
        if !backend.exists() {
            self.set_error_state(false);
        } else {
            let consistent = check_errors(backend, registry);
            metrics::record_consistency_check(consistent);
            self.set_error_state(!consistent);
        }
        self.ensure_file_watched(backend);
    }

    /// Handles one change notification for the backing file.
    pub fn on_file_changed<B>(&mut self, path: &Path, backend: &B, registry: &HandlerRegistry)
    where
        B: SettingsBackend + ?Sized,
    {
        self.events.emit(ConfigEvent::FileChanged(path.to_path_buf()));

        let file = backend.file_path();
        if file.exists() {
            if let Some(watcher) = self.watcher.as_mut() {
                if let Err(e) = watcher.watch(file) {
                    tracing::warn!(path = ?file, error = %e, "Failed to re-watch settings file");
                }
            }
        }

        if self.state.take_skip() {
            tracing::debug!(path = ?path, "Skipping check for self-inflicted change");
            metrics::record_file_event("skipped");
            return;
        }

        metrics::record_file_event("checked");
        self.check_and_handle_error(backend, registry);

        if !backend.exists() {
            self.state.error.mark_pending();
        }
    }

    /// Handles a raw watcher event; a removed file loses its watch first.
    pub fn on_file_event<B>(
        &mut self,
        event: &FileEvent,
        backend: &B,
        registry: &HandlerRegistry,
    ) where
        B: SettingsBackend + ?Sized,
    {
        if event.removed {
            if let Some(watcher) = self.watcher.as_mut() {
                watcher.forget(backend.file_path());
            }
        }
        self.on_file_changed(&event.path, backend, registry);
    }

    /// Creates the file if missing and registers the watch if none is held.
    pub fn ensure_file_watched<B>(&mut self, backend: &B)
    where
        B: SettingsBackend + ?Sized,
    {
        if let Err(e) = backend.touch() {
            tracing::warn!(error = %e, "Failed to create settings file");
            return;
        }
        if let Some(watcher) = self.watcher.as_mut() {
            if watcher.files().is_empty() {
                let path = backend.file_path();
                if let Err(e) = watcher.watch(path) {
                    tracing::warn!(path = ?path, error = %e, "Failed to watch settings file");
                }
            }
        }
    }
}

/// Keys in the default group that have no handler.
pub fn unrecognized_settings<B>(
    backend: &B,
    registry: &HandlerRegistry,
) -> Result<BTreeSet<String>, BackendError>
where
    B: SettingsBackend + ?Sized,
{
    let keys = backend.all_keys()?;
    Ok(keys_in_group(&keys, DEFAULT_GROUP)
        .into_iter()
        .filter(|key| !registry.contains(key))
        .collect())
}

/// Recognized keys whose stored value fails their handler's check.
/// Unrecognized keys are ignored here.
pub fn invalid_settings<B>(
    backend: &B,
    registry: &HandlerRegistry,
) -> Result<BTreeSet<String>, BackendError>
where
    B: SettingsBackend + ?Sized,
{
    let mut offenders = BTreeSet::new();
    for key in backend.all_keys()? {
        let Some(handler) = registry.get(&key) else {
            continue;
        };
        if let Some(raw) = backend.get(&key)? {
            if !handler.check(&raw) {
                tracing::debug!(
                    key = %key,
                    value = %raw,
                    expected = handler.expected(),
                    "Invalid setting"
                );
                offenders.insert(key);
            }
        }
    }
    Ok(offenders)
}

/// True iff there are no unrecognized keys and no invalid values. An
/// unreadable file is inconsistent.
pub fn check_errors<B>(backend: &B, registry: &HandlerRegistry) -> bool
where
    B: SettingsBackend + ?Sized,
{
    let unrecognized = match unrecognized_settings(backend, registry) {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!(error = %e, "Settings file unreadable");
            return false;
        }
    };
    if !unrecognized.is_empty() {
        tracing::debug!(keys = ?unrecognized, "Unrecognized settings");
        return false;
    }
    match invalid_settings(backend, registry) {
        Ok(keys) => keys.is_empty(),
        Err(e) => {
            tracing::warn!(error = %e, "Settings file unreadable");
            false
        }
    }
}
