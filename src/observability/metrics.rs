//! Metrics collection.
//!
//! # Metrics
//! - `settings_consistency_checks_total` (counter): full checks by result
//! - `settings_error_state` (gauge): 1=inconsistent, 0=healthy
//! - `settings_blocked_writes_total` (counter): writes refused while inconsistent
//! - `settings_file_events_total` (counter): file events by action (checked/skipped)

use ::metrics::{counter, gauge};

pub fn record_consistency_check(consistent: bool) {
    let result = if consistent { "consistent" } else { "inconsistent" };
    counter!("settings_consistency_checks_total", "result" => result).increment(1);
}

pub fn record_error_state(has_error: bool) {
    gauge!("settings_error_state").set(if has_error { 1.0 } else { 0.0 });
}

pub fn record_blocked_write() {
    counter!("settings_blocked_writes_total").increment(1);
}

pub fn record_file_event(action: &'static str) {
    counter!("settings_file_events_total", "action" => action).increment(1);
}
