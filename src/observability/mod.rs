//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! store + monitor produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (check counters, error-state gauge)
//!
//! Consumers:
//!     → stderr (pretty or JSON lines)
//!     → any metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the binary's job
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
