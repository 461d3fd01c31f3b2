//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process env + optional .env file
//!     → env.rs (prefix filter, case folding, .env merge)
//!     → validation.rs (per-field coercion and range checks)
//!     → loader.rs (credential file check, once-only snapshot, log events)
//!     → AcdcnConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - Every field has a default so an empty environment is valid apart from
//!   the credential file
//! - Validation separates coercion and ranges from file-system checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::EnvSource;
pub use loader::{ConfigError, ConfigLoader};
pub use schema::AcdcnConfig;
pub use validation::FieldError;
