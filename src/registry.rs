//! Handler registry: the schema of recognized settings.
//!
//! # Responsibilities
//! - Map each recognized key to exactly one [`ValueHandler`]
//! - Answer "is this key recognized?" for the consistency checks
//!
//! # Design Decisions
//! - Built once through [`RegistryBuilder`], immutable afterwards
//! - Registering a key twice is a build error, not a silent overwrite
//! - Ordered map so listings and diagnostics are deterministic

use std::collections::{BTreeMap, BTreeSet};

use crate::error::RegistryError;
use crate::handler::shortcut::{Key, Modifier};
use crate::handler::ValueHandler;

/// Key of the display name setting.
pub const KEY_NAME: &str = "name";
/// Key of the working directory setting.
pub const KEY_PATH: &str = "path";
/// Key of the primary shortcut setting.
pub const KEY_SHORTCUT: &str = "shortCut";

/// Default value of [`KEY_NAME`].
pub const DEFAULT_NAME: &str = "Config Handler";

/// Immutable mapping from key name to handler.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, ValueHandler>,
}

impl HandlerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The application's general settings schema.
    pub fn general() -> Result<Self, RegistryError> {
        let registry = Self::builder()
            .register(KEY_NAME, ValueHandler::string(DEFAULT_NAME))?
            .register(KEY_PATH, ValueHandler::existing_directory())?
            .register(
                KEY_SHORTCUT,
                ValueHandler::key_shortcut_of(vec![Modifier::Ctrl], Key::Char('S')),
            )?
            .build();
        Ok(registry)
    }

    /// Handler for `key`, or `None` if the key is unrecognized.
    pub fn get(&self, key: &str) -> Option<&ValueHandler> {
        self.handlers.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Every recognized key name.
    pub fn keys(&self) -> BTreeSet<String> {
        self.handlers.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueHandler)> {
        self.handlers.iter().map(|(k, h)| (k.as_str(), h))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Collects registrations and rejects duplicates.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    handlers: BTreeMap<String, ValueHandler>,
}

impl RegistryBuilder {
    pub fn register(
        mut self,
        key: impl Into<String>,
        handler: ValueHandler,
    ) -> Result<Self, RegistryError> {
        let key = key.into();
        if key.is_empty() {
            return Err(RegistryError::EmptyKey);
        }
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        self.handlers.insert(key, handler);
        Ok(self)
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}
