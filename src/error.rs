//! Error types shared across the settings subsystems.
//!
//! Validation failures are never reported through these types: an invalid or
//! unrecognized stored value is absorbed into the monitor's error state and
//! masked by a fallback. These errors cover I/O, syntax and misuse only.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a settings backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Reading or writing the settings file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file exists but is not well-formed.
    #[error("Malformed settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The in-memory document could not be rendered back to text.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The key is empty, has an empty segment, or collides with a section.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Errors raised while building a handler registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Key registered twice: {0}")]
    DuplicateKey(String),

    #[error("Key must not be empty")]
    EmptyKey,
}

/// Errors produced when parsing a keyboard shortcut.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeySequenceError {
    #[error("Empty key combination")]
    Empty,

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("A key sequence holds at most {max} chords, got {count}")]
    TooManyChords { count: usize, max: usize },
}

/// Errors raised by [`crate::store::ConfigStore`] write operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// No handler is registered for the key.
    #[error("Unrecognized setting: {0}")]
    UnrecognizedKey(String),

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
