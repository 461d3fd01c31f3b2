//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build ClientManager → AppContext
//!     (first acquire() then connects the database client)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then the client manager
//! - No explicit teardown; the client lives until process exit

pub mod startup;

pub use startup::{AppContext, StartupError};
