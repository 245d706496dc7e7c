//! Shared utilities for integration tests.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use settings_guard::{ConfigEvent, ConfigStore, HandlerRegistry, StoreConfig, TomlFileBackend};
use tempfile::TempDir;
use tokio::sync::broadcast;

/// Store over a fresh temporary settings file, without a watcher.
#[allow(dead_code)]
pub fn temp_store() -> (TempDir, ConfigStore) {
    let dir = tempfile::tempdir().unwrap();
    let backend = TomlFileBackend::new(dir.path().join("settings.toml"));
    let registry = Arc::new(HandlerRegistry::general().unwrap());
    let store = ConfigStore::new(backend, registry);
    (dir, store)
}

/// Store over a fresh temporary settings file with a live file watcher.
#[allow(dead_code)]
pub fn watched_store() -> (TempDir, ConfigStore) {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        file: Some(dir.path().join("settings.toml")),
        watch: true,
        poll_interval_ms: 50,
        ..StoreConfig::default()
    };
    let store = ConfigStore::open(&config).unwrap();
    (dir, store)
}

/// Edits the settings file behind the store's back.
pub fn write_external(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

/// Every event currently buffered, FileChanged notifications excluded.
pub fn drain_transitions(rx: &mut broadcast::Receiver<ConfigEvent>) -> Vec<ConfigEvent> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .filter(|e| !matches!(e, ConfigEvent::FileChanged(_)))
        .collect()
}

/// Pumps watcher events until `done` holds or the timeout expires.
#[allow(dead_code)]
pub fn pump_until(store: &ConfigStore, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        store.process_pending_file_events();
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}
