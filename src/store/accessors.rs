//! Typed accessors for the general settings.

use std::path::PathBuf;

use crate::backend::SettingsBackend;
use crate::error::StoreResult;
use crate::handler::{scalar_string, RawValue};
use crate::registry::{KEY_NAME, KEY_PATH, KEY_SHORTCUT};
use crate::store::ConfigStore;

impl<B: SettingsBackend> ConfigStore<B> {
    pub fn name(&self) -> String {
        self.text_value(KEY_NAME)
    }

    pub fn set_name(&self, name: &str) -> StoreResult<()> {
        self.set_if_changed(KEY_NAME, name)
    }

    /// Working directory; empty when no candidate directory exists.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.text_value(KEY_PATH))
    }

    pub fn set_path(&self, path: &str) -> StoreResult<()> {
        self.set_if_changed(KEY_PATH, path)
    }

    /// Shortcut in display form, e.g. `Ctrl+s`.
    pub fn short_cut(&self) -> String {
        self.text_value(KEY_SHORTCUT)
    }

    pub fn set_short_cut(&self, short_cut: &str) -> StoreResult<()> {
        self.set_if_changed(KEY_SHORTCUT, short_cut)
    }

    fn text_value(&self, key: &str) -> String {
        self.value(key)
            .and_then(|v| scalar_string(&v))
            .unwrap_or_default()
    }

    // Writes only when the served value differs.
    fn set_if_changed(&self, key: &str, value: &str) -> StoreResult<()> {
        let value = RawValue::String(value.to_string());
        if self.served_value(key).as_ref() == Some(&value) {
            return Ok(());
        }
        self.set_value(key, value)
    }

    // What `value` would serve, without touching the error flag, so that a
    // setter for a key never written is not blocked by its own comparison.
    fn served_value(&self, key: &str) -> Option<RawValue> {
        let handler = self.registry.get(key)?;
        let guard = self.lock();
        if guard.monitor.state().error.has_error() {
            return handler.fallback();
        }
        match guard.backend.get(key) {
            Ok(raw) => handler.value(raw.as_ref()),
            Err(_) => handler.fallback(),
        }
    }
}
