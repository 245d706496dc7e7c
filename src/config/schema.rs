//! Runtime configuration schema.
//!
//! Describes where the settings file lives and how the store around it
//! behaves. All types derive Serde traits for deserialization from a TOML
//! file, and every field has a default so an empty file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for a settings store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Organization directory under the user config dir.
    pub organization: String,

    /// Application name; the settings file is `<application>.toml`.
    pub application: String,

    /// Explicit settings file, overriding organization/application.
    pub file: Option<PathBuf>,

    /// Watch the settings file for external edits.
    pub watch: bool,

    /// Poll interval for platforms without native file events.
    pub poll_interval_ms: u64,

    /// Logging settings (used by the binary).
    pub logging: LoggingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            organization: "config_handler".to_string(),
            application: "config_handler_app".to_string(),
            file: None,
            watch: true,
            poll_interval_ms: 2_000,
            logging: LoggingConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Location of the settings file.
    ///
    /// `file` when set, else `<config dir>/<organization>/<application>.toml`.
    pub fn settings_path(&self) -> PathBuf {
        if let Some(file) = &self.file {
            return file.clone();
        }
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(&self.organization);
        path.push(format!("{}.toml", self.application));
        path
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive when `RUST_LOG` is unset (e.g. "info", "settings_guard=debug").
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "settings_guard=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
