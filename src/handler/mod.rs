//! Per-key value handlers.
//!
//! # Data Flow
//! ```text
//! read:  raw stored value
//!     → check()          (type/format predicate)
//!     → process()        (valid: normalize for the caller)
//!     → fallback()       (absent or invalid)
//!
//! write: typed value
//!     → representation() (form to persist)
//!     → backend
//! ```
//!
//! # Design Decisions
//! - Closed set of variants; the schema is fixed at registration time
//! - No operation fails: invalidity routes to the fallback
//! - Handlers are stateless apart from their default payload

pub mod directory;
pub mod shortcut;

use crate::handler::shortcut::{Key, KeyChord, KeySequence, Modifier};

/// Untyped value as persisted by the backend.
pub type RawValue = toml::Value;

/// How one configuration key is checked, defaulted and represented.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueHandler {
    /// Any value is accepted; falls back to a fixed default.
    String { default: String },

    /// A non-empty path to an existing directory; falls back to the first
    /// existing well-known directory.
    ExistingDirectory,

    /// A keyboard shortcut or the empty string.
    KeyShortcut { fallback: Option<KeySequence> },
}

impl ValueHandler {
    pub fn string(default: impl Into<String>) -> Self {
        ValueHandler::String {
            default: default.into(),
        }
    }

    pub fn existing_directory() -> Self {
        ValueHandler::ExistingDirectory
    }

    pub fn key_shortcut(fallback: Option<KeySequence>) -> Self {
        ValueHandler::KeyShortcut { fallback }
    }

    /// Shortcut handler defaulting to `modifiers+key`.
    pub fn key_shortcut_of(modifiers: Vec<Modifier>, key: Key) -> Self {
        Self::key_shortcut(Some(KeySequence::from(KeyChord::new(modifiers, key))))
    }

    /// True iff `raw` satisfies this key's format constraints.
    pub fn check(&self, raw: &RawValue) -> bool {
        match self {
            ValueHandler::String { .. } => true,
            ValueHandler::ExistingDirectory => {
                scalar_string(raw).is_some_and(|text| directory::check(&text))
            }
            ValueHandler::KeyShortcut { .. } => {
                scalar_string(raw).is_some_and(|text| shortcut::check(&text))
            }
        }
    }

    /// Value served when the stored one is absent or invalid.
    pub fn fallback(&self) -> Option<RawValue> {
        match self {
            ValueHandler::String { default } => Some(RawValue::String(default.clone())),
            ValueHandler::ExistingDirectory => {
                directory::first_existing(directory::well_known_directories())
                    .map(|path| RawValue::String(path.to_string_lossy().into_owned()))
            }
            ValueHandler::KeyShortcut { fallback } => {
                let text = fallback
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                Some(RawValue::String(shortcut::process(&text)))
            }
        }
    }

    /// Form written to the backend for an in-memory value.
    pub fn representation(&self, value: &RawValue) -> RawValue {
        let Some(text) = scalar_string(value) else {
            return value.clone();
        };
        match self {
            ValueHandler::KeyShortcut { .. } => RawValue::String(shortcut::representation(&text)),
            _ => RawValue::String(text),
        }
    }

    /// Normalizes a valid stored value for the caller.
    pub fn process(&self, raw: &RawValue) -> RawValue {
        match (self, scalar_string(raw)) {
            (ValueHandler::KeyShortcut { .. }, Some(text)) => {
                RawValue::String(shortcut::process(&text))
            }
            _ => raw.clone(),
        }
    }

    /// `process(raw)` when present and valid, `fallback()` otherwise.
    pub fn value(&self, raw: Option<&RawValue>) -> Option<RawValue> {
        match raw {
            Some(raw) if self.check(raw) => Some(self.process(raw)),
            _ => self.fallback(),
        }
    }

    /// Human-readable description of the accepted format.
    pub fn expected(&self) -> &'static str {
        match self {
            ValueHandler::String { .. } => "string",
            ValueHandler::ExistingDirectory => "existing directory",
            ValueHandler::KeyShortcut { .. } => "keyboard shortcut",
        }
    }
}

/// String form of a scalar value; `None` for arrays and tables.
pub fn scalar_string(value: &RawValue) -> Option<String> {
    match value {
        RawValue::String(s) => Some(s.clone()),
        RawValue::Integer(n) => Some(n.to_string()),
        RawValue::Float(n) => Some(n.to_string()),
        RawValue::Boolean(b) => Some(b.to_string()),
        RawValue::Datetime(dt) => Some(dt.to_string()),
        RawValue::Array(_) | RawValue::Table(_) => None,
    }
}
