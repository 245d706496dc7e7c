//! Consistency error state machine.
//!
//! # States
//! - Unchecked: no check since startup (or since the file vanished); reads as healthy
//! - Checked(false): last check found the settings consistent
//! - Checked(true): an unrecognized key or invalid value is present
//!
//! # State Transitions
//! ```text
//! healthy → Checked(true):  emits Error
//! Checked(true) → Checked(false): emits ErrorResolved
//! anything else: no event
//! any → Unchecked: mark_pending(), forces a check on the next has_error()
//! ```

use crate::monitor::events::ConfigEvent;

/// Cached result of the last consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorState {
    #[default]
    Unchecked,
    Checked(bool),
}

impl ErrorState {
    /// Current error flag; `Unchecked` counts as healthy.
    pub fn has_error(&self) -> bool {
        matches!(self, ErrorState::Checked(true))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ErrorState::Unchecked)
    }

    /// Records a check result and returns the event for a transition.
    pub fn set(&mut self, error: bool) -> Option<ConfigEvent> {
        let had_error = self.has_error();
        *self = ErrorState::Checked(error);
        match (had_error, error) {
            (false, true) => Some(ConfigEvent::Error),
            (true, false) => Some(ConfigEvent::ErrorResolved),
            _ => None,
        }
    }

    pub fn mark_pending(&mut self) {
        *self = ErrorState::Unchecked;
    }
}

/// All mutable monitor state; guarded by the store's lock.
#[derive(Debug, Default)]
pub struct MonitorState {
    pub error: ErrorState,
    /// Set before a programmatic write, consumed by the next file event.
    pub skip_next_check: bool,
}

impl MonitorState {
    pub fn arm_skip(&mut self) {
        self.skip_next_check = true;
    }

    /// Returns whether the skip flag was set, clearing it.
    pub fn take_skip(&mut self) -> bool {
        std::mem::take(&mut self.skip_next_check)
    }
}
