//! Validated settings store.
//!
//! # Data Flow
//! ```text
//! value(key):
//!     → registry lookup (unrecognized → None)
//!     → monitor.has_error (first call runs a full check)
//!     → backend.get → handler.check
//!         absent / invalid → error flag set, fallback served
//!     → handler.process (valid)
//!
//! set_value(key, v):
//!     → blocked while the error flag is set
//!     → arm skip flag → handler.representation → backend.set
//! ```
//!
//! # Design Decisions
//! - Reads never fail: inconsistency is absorbed into the error flag
//! - A single mutex covers backend and monitor so every transition sees the
//!   previous state atomically
//! - File events are consumed on the caller's control flow, never on the
//!   watcher thread

mod accessors;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use crate::backend::{keys_in_group, SettingsBackend, TomlFileBackend};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::handler::{RawValue, ValueHandler};
use crate::monitor::{
    self, ConfigEvent, ConsistencyMonitor, EventBus, FileEvent, FileWatcher, ERROR_MESSAGE,
};
use crate::observability::metrics;
use crate::registry::HandlerRegistry;

struct StoreInner<B> {
    backend: B,
    monitor: ConsistencyMonitor,
}

/// Typed, validated view over a settings backend.
pub struct ConfigStore<B: SettingsBackend = TomlFileBackend> {
    inner: Mutex<StoreInner<B>>,
    registry: Arc<HandlerRegistry>,
    events: EventBus,
    file_events: Mutex<Option<mpsc::UnboundedReceiver<FileEvent>>>,
}

impl ConfigStore<TomlFileBackend> {
    /// Opens the settings file described by `config` with the general schema.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let backend = TomlFileBackend::new(config.settings_path());
        let registry = Arc::new(HandlerRegistry::general()?);

        let store = if config.watch {
            let (watcher, file_events) =
                FileWatcher::new(Duration::from_millis(config.poll_interval_ms))?;
            Self::with_watcher(backend, registry, watcher, file_events)
        } else {
            Self::new(backend, registry)
        };

        tracing::info!(
            path = ?store.file_path(),
            watch = config.watch,
            recognized_keys = store.registry.len(),
            "Settings store opened"
        );
        Ok(store)
    }
}

impl<B: SettingsBackend> ConfigStore<B> {
    /// Store without a file watcher; feed changes through [`Self::on_file_changed`].
    pub fn new(backend: B, registry: Arc<HandlerRegistry>) -> Self {
        Self::build(backend, registry, None, None)
    }

    /// Store whose watcher reports into `file_events`.
    pub fn with_watcher(
        backend: B,
        registry: Arc<HandlerRegistry>,
        watcher: FileWatcher,
        file_events: mpsc::UnboundedReceiver<FileEvent>,
    ) -> Self {
        Self::build(backend, registry, Some(watcher), Some(file_events))
    }

    fn build(
        backend: B,
        registry: Arc<HandlerRegistry>,
        watcher: Option<FileWatcher>,
        file_events: Option<mpsc::UnboundedReceiver<FileEvent>>,
    ) -> Self {
        let events = EventBus::new();
        let mut monitor = ConsistencyMonitor::new(events.clone(), watcher);
        monitor.ensure_file_watched(&backend);

        Self {
            inner: Mutex::new(StoreInner { backend, monitor }),
            registry,
            events,
            file_events: Mutex::new(file_events),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner<B>> {
        self.inner.lock().expect("settings store mutex poisoned")
    }

    fn handler(&self, key: &str) -> StoreResult<&ValueHandler> {
        self.registry
            .get(key)
            .ok_or_else(|| StoreError::UnrecognizedKey(key.to_string()))
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn file_path(&self) -> PathBuf {
        self.lock().backend.file_path().to_path_buf()
    }

    /// Subscribe to Error / ErrorResolved / FileChanged notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.events.subscribe()
    }

    /// Writes `value` for `key` in its storage representation.
    ///
    /// Silently does nothing while the store is in the error state.
    pub fn set_value(&self, key: &str, value: impl Into<RawValue>) -> StoreResult<()> {
        let handler = self.handler(key)?;
        let value = value.into();

        let mut guard = self.lock();
        let StoreInner { backend, monitor } = &mut *guard;

        if monitor.has_error(backend, &self.registry) {
            tracing::debug!(key = %key, "Write ignored while settings are inconsistent");
            metrics::record_blocked_write();
            return Ok(());
        }

        monitor.arm_skip();
        if let Err(e) = backend.set(key, handler.representation(&value)) {
            monitor.disarm_skip();
            return Err(e.into());
        }
        Ok(())
    }

    /// Validated value for `key`, or its fallback.
    ///
    /// An absent or invalid stored value sets the error flag. Returns `None`
    /// only for unrecognized keys and for fallbacks that have no value (no
    /// well-known directory exists).
    pub fn value(&self, key: &str) -> Option<RawValue> {
        let Some(handler) = self.registry.get(key) else {
            tracing::warn!(key = %key, "Read of unrecognized setting");
            return None;
        };

        let mut guard = self.lock();
        let StoreInner { backend, monitor } = &mut *guard;

        if monitor.has_error(backend, &self.registry) {
            return handler.fallback();
        }

        let raw = match backend.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Unreadable setting");
                monitor.set_error_state(true);
                return handler.fallback();
            }
        };

        let Some(raw) = raw else {
            tracing::debug!(key = %key, "Setting absent, serving fallback");
            monitor.set_error_state(true);
            return handler.fallback();
        };

        if !handler.check(&raw) {
            tracing::debug!(
                key = %key,
                value = %raw,
                expected = handler.expected(),
                "Invalid value"
            );
            monitor.set_error_state(true);
            return handler.fallback();
        }

        Some(handler.process(&raw))
    }

    pub fn remove(&self, key: &str) -> StoreResult<()> {
        self.lock().backend.remove(key)?;
        Ok(())
    }

    /// Removes every stored key.
    pub fn clear_settings(&self) -> StoreResult<()> {
        let mut guard = self.lock();
        for key in guard.backend.all_keys()? {
            guard.backend.remove(&key)?;
        }
        guard.backend.flush()?;
        Ok(())
    }

    /// Overwrites `key` with its fallback, or removes it when the fallback
    /// has no value.
    pub fn reset_value(&self, key: &str) -> StoreResult<()> {
        let handler = self.handler(key)?;
        let mut guard = self.lock();
        match handler.fallback() {
            Some(fallback) => guard.backend.set(key, handler.representation(&fallback))?,
            None => guard.backend.remove(key)?,
        }
        Ok(())
    }

    /// Base names of the stored keys in `group`.
    pub fn keys_from_group(&self, group: &str) -> BTreeSet<String> {
        match self.lock().backend.all_keys() {
            Ok(keys) => keys_in_group(&keys, group),
            Err(e) => {
                tracing::warn!(group = %group, error = %e, "Cannot list settings");
                BTreeSet::new()
            }
        }
    }

    /// Every key the registry knows.
    pub fn recognized_keys(&self) -> BTreeSet<String> {
        self.registry.keys()
    }

    /// Default-group keys without a handler.
    pub fn unrecognized_settings(&self) -> StoreResult<BTreeSet<String>> {
        let guard = self.lock();
        Ok(monitor::unrecognized_settings(&guard.backend, &self.registry)?)
    }

    /// Recognized keys holding values their handler rejects.
    pub fn invalid_settings(&self) -> StoreResult<BTreeSet<String>> {
        let guard = self.lock();
        Ok(monitor::invalid_settings(&guard.backend, &self.registry)?)
    }

    pub fn check_unrecognized_settings(&self) -> bool {
        self.unrecognized_settings()
            .map(|keys| keys.is_empty())
            .unwrap_or(false)
    }

    pub fn check_valid(&self) -> bool {
        self.invalid_settings()
            .map(|keys| keys.is_empty())
            .unwrap_or(false)
    }

    /// Both checks pass.
    pub fn check_errors(&self) -> bool {
        let guard = self.lock();
        monitor::check_errors(&guard.backend, &self.registry)
    }

    /// Recomputes the error flag now.
    pub fn check_and_handle_error(&self) {
        let mut guard = self.lock();
        let StoreInner { backend, monitor } = &mut *guard;
        monitor.check_and_handle_error(backend, &self.registry);
    }

    pub fn set_error_state(&self, error: bool) {
        self.lock().monitor.set_error_state(error);
    }

    pub fn has_error(&self) -> bool {
        let mut guard = self.lock();
        let StoreInner { backend, monitor } = &mut *guard;
        monitor.has_error(backend, &self.registry)
    }

    pub fn error_message(&self) -> &'static str {
        ERROR_MESSAGE
    }

    /// Reacts to a change of the backing file at `path`.
    pub fn on_file_changed(&self, path: &Path) {
        let mut guard = self.lock();
        let StoreInner { backend, monitor } = &mut *guard;
        monitor.on_file_changed(path, backend, &self.registry);
    }

    /// Reacts to a watcher event.
    pub fn on_file_event(&self, event: &FileEvent) {
        let mut guard = self.lock();
        let StoreInner { backend, monitor } = &mut *guard;
        monitor.on_file_event(event, backend, &self.registry);
    }

    /// Handles every queued watcher event without blocking. Returns how many
    /// were handled; zero once the receiver has been taken.
    pub fn process_pending_file_events(&self) -> usize {
        let mut file_events = self.file_events.lock().expect("file event mutex poisoned");
        let Some(rx) = file_events.as_mut() else {
            return 0;
        };
        let mut handled = 0;
        while let Ok(event) = rx.try_recv() {
            self.on_file_event(&event);
            handled += 1;
        }
        handled
    }

    /// Hands the watcher's event receiver to an external (async) driver.
    pub fn take_file_events(&self) -> Option<mpsc::UnboundedReceiver<FileEvent>> {
        self.file_events
            .lock()
            .expect("file event mutex poisoned")
            .take()
    }

    /// Files the watcher currently holds.
    pub fn watched_files(&self) -> Vec<PathBuf> {
        self.lock()
            .monitor
            .watcher()
            .map(|w| w.files().iter().cloned().collect())
            .unwrap_or_default()
    }
}
