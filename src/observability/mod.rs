//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config and database subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges via the `metrics` facade)
//!
//! Consumers (installed by the host process):
//!     → stderr, pretty or JSON
//!     → any `metrics` recorder
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated secrets
//! - The credential path and private key are never logged
//! - Metric updates are atomic increments

pub mod logging;
pub mod metrics;
