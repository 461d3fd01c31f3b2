//! Seam between this crate and the managed document-database SDK.
//!
//! # Responsibilities
//! - `Connector`: authenticate with a service-account key and open one client
//! - `DocumentStore`: the data-plane calls the rest of ACDCN relies on
//!
//! # Design Decisions
//! - Authentication, pooling, query execution and consistency belong to the
//!   implementation behind these traits
//! - Implementations report failures as `ConnectError` / `StoreError` so the
//!   manager can tell transient from permanent

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::database::credentials::ServiceAccountKey;
use crate::database::types::{ConnectError, StoreError, WriteOp};

/// An open connection to one database instance.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap round trip used for health probes.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fetch one document; `None` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Create or replace one document.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    /// Delete one document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Apply every write atomically, or none of them.
    async fn commit(&self, writes: &[WriteOp]) -> Result<(), StoreError>;
}

/// Builds a [`DocumentStore`] from credentials.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Authenticate and open a client for `database`.
    async fn connect(
        &self,
        key: &ServiceAccountKey,
        database: &str,
    ) -> Result<Arc<dyn DocumentStore>, ConnectError>;
}
