//! ACDCN bootstrap layer: validated configuration and the managed
//! document-database client.

pub mod config;
pub mod database;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::{AcdcnConfig, ConfigError, ConfigLoader};
pub use database::{ClientError, ClientHandle, ClientManager};
pub use lifecycle::{AppContext, StartupError};
