//! Validated, self-monitoring application settings.
//!
//! A [`ConfigStore`] wraps a settings file whose keys are governed by a
//! [`HandlerRegistry`]. Every read is validated; any unrecognized key or
//! invalid value puts the whole store into an error state in which reads
//! serve defaults and writes are ignored until the file is fixed.

pub mod backend;
pub mod config;
pub mod error;
pub mod handler;
pub mod monitor;
pub mod observability;
pub mod registry;
pub mod store;

pub use backend::{SettingsBackend, TomlFileBackend};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use handler::{RawValue, ValueHandler};
pub use monitor::{ConfigEvent, ERROR_MESSAGE};
pub use registry::HandlerRegistry;
pub use store::ConfigStore;
