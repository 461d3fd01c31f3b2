//! Managed document-database subsystem.
//!
//! # Data Flow
//! ```text
//! AcdcnConfig (credential path, database name, retry budget)
//!     → credentials.rs (service-account key file)
//!     → connector.rs (SDK seam: authenticate, open one client)
//!     → manager.rs (once-only construction, retries, timeouts)
//!     → ClientHandle (shared by Arc; operations + batched writes)
//!     → stats.rs (error/operation counters, health timestamp, state)
//! ```
//!
//! # Security Constraints
//! - The credential path and private key never reach the logs
//! - Authentication failures are surfaced, never retried

pub mod batch;
pub mod connector;
pub mod credentials;
pub mod manager;
pub mod memory;
pub mod stats;
pub mod types;

pub use connector::{Connector, DocumentStore};
pub use credentials::ServiceAccountKey;
pub use manager::{ClientHandle, ClientManager};
pub use memory::{MemoryConnector, MemoryStore};
pub use stats::{ConnectionStats, StatsSnapshot};
pub use types::{ClientError, ClientResult, ClientState, ConnectError, StoreError, WriteOp};
