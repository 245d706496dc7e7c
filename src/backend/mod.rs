//! Persistent key-value backends.
//!
//! # Data Flow
//! ```text
//! ConfigStore
//!     → SettingsBackend (get / set / remove / all_keys / flush)
//!     → file.rs (INI-style sections in TOML syntax on disk)
//! ```
//!
//! # Key Addressing
//! - `"key"` lives in the default group (top level of the file)
//! - `"Group/key"` lives in `[Group]`; deeper paths nest further
//! - `"General/key"` is the same entry as `"key"`
//!
//! # Design Decisions
//! - Backends store raw values only; validation is the store's concern
//! - Keys are case-sensitive

pub mod file;

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::BackendError;
use crate::handler::RawValue;

pub use file::TomlFileBackend;

/// Separator between group and key names.
pub const GROUP_SEPARATOR: char = '/';

/// Name of the default group.
pub const DEFAULT_GROUP: &str = "General";

/// Persistent namespaced key-value map backed by a file.
pub trait SettingsBackend: Send {
    /// Location of the backing file.
    fn file_path(&self) -> &Path;

    fn exists(&self) -> bool {
        self.file_path().is_file()
    }

    /// Raw value for `key`; `Ok(None)` when never set.
    fn get(&self, key: &str) -> Result<Option<RawValue>, BackendError>;

    fn set(&mut self, key: &str, value: RawValue) -> Result<(), BackendError>;

    /// Removes `key`, or every key below it when it names a group.
    fn remove(&mut self, key: &str) -> Result<(), BackendError>;

    /// Every stored key, in `Group/key` form.
    fn all_keys(&self) -> Result<Vec<String>, BackendError>;

    /// Forces pending writes to disk.
    fn flush(&mut self) -> Result<(), BackendError>;

    /// Creates an empty backing file if none exists.
    fn touch(&self) -> Result<(), BackendError>;
}

/// Splits a key into its path segments, folding the default group into the
/// top level.
pub fn key_segments(key: &str) -> Result<Vec<&str>, BackendError> {
    let prefix = format!("{}{}", DEFAULT_GROUP, GROUP_SEPARATOR);
    let key = key.strip_prefix(prefix.as_str()).unwrap_or(key);
    let segments: Vec<&str> = key.split(GROUP_SEPARATOR).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(BackendError::InvalidKey(key.to_string()));
    }
    Ok(segments)
}

/// Final segment of a key: `"Group/key"` → `"key"`.
pub fn base_name(key: &str) -> &str {
    key.rsplit(GROUP_SEPARATOR).next().unwrap_or(key)
}

/// Base names of the keys in `group`. The default group holds every key
/// without a separator.
pub fn keys_in_group<S: AsRef<str>>(keys: &[S], group: &str) -> BTreeSet<String> {
    let prefix = format!("{}{}", group, GROUP_SEPARATOR);
    let mut found = BTreeSet::new();
    for key in keys {
        let key: &str = key.as_ref();
        if group == DEFAULT_GROUP && !key.contains(GROUP_SEPARATOR) {
            found.insert(key.to_string());
        } else if key.starts_with(prefix.as_str()) {
            found.insert(base_name(key).to_string());
        }
    }
    found
}
