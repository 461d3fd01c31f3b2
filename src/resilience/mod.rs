//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the database SDK:
//!     → per-attempt timeout (tokio::time::timeout, applied by the caller)
//!     → On failure: retries.rs (transient? budget left? back off, try again)
//!     → backoff.rs (exponential delay with jitter)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Authentication and validation failures are never retried
//! - A zero base delay turns backoff off entirely

pub mod backoff;
pub mod retries;

pub use backoff::Backoff;
pub use retries::{RetryFailure, RetryPolicy, Retryable};
