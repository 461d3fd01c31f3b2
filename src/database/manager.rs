//! Managed client lifecycle.
//!
//! # Responsibilities
//! - Build exactly one client per manager, on first use
//! - Retry transient connection and operation failures within the budget
//! - Keep error/operation counters and the health timestamp current
//!
//! # State Transitions
//! ```text
//! Uninitialized → Initializing: first acquire()
//! Initializing → Ready: connector returned a store
//! Initializing → Uninitialized: initialization failed (next acquire tries again)
//! Ready → Degraded: failed health probe, or transient retries exhausted
//! Degraded → Ready: successful probe or operation
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value;
use tokio::sync::OnceCell;
use tokio::time::timeout;

use crate::config::AcdcnConfig;
use crate::database::batch::chunk_writes;
use crate::database::connector::{Connector, DocumentStore};
use crate::database::credentials::ServiceAccountKey;
use crate::database::stats::{ConnectionStats, StatsSnapshot};
use crate::database::types::{
    ClientError, ClientResult, ClientState, ConnectError, StoreError, WriteOp,
};
use crate::observability::metrics;
use crate::resilience::{RetryFailure, RetryPolicy, Retryable};

/// Owns the single client for one configuration.
pub struct ClientManager {
    config: Arc<AcdcnConfig>,
    connector: Arc<dyn Connector>,
    stats: Arc<ConnectionStats>,
    handle: OnceCell<Arc<ClientHandle>>,
}

impl ClientManager {
    /// Create a manager. Nothing is read or connected until [`acquire`](Self::acquire).
    pub fn new(config: Arc<AcdcnConfig>, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            stats: Arc::new(ConnectionStats::new()),
            handle: OnceCell::new(),
        }
    }

    /// Get the client, constructing it on first call.
    ///
    /// Concurrent first callers wait for the one in-flight construction and
    /// all receive the same handle.
    pub async fn acquire(&self) -> ClientResult<Arc<ClientHandle>> {
        self.handle
            .get_or_try_init(|| self.initialize())
            .await
            .cloned()
    }

    /// Whether a client has been constructed.
    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    pub fn state(&self) -> ClientState {
        self.stats.state()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &Arc<AcdcnConfig> {
        &self.config
    }

    async fn initialize(&self) -> ClientResult<Arc<ClientHandle>> {
        self.stats.set_state(ClientState::Initializing);

        match self.connect().await {
            Ok(handle) => {
                self.stats.set_state(ClientState::Ready);
                Ok(Arc::new(handle))
            }
            Err(e) => {
                self.stats.set_state(ClientState::Uninitialized);
                tracing::error!(error = %e, "firestore_initialization_failed");
                Err(e)
            }
        }
    }

    async fn connect(&self) -> ClientResult<ClientHandle> {
        // 1. Load the service-account key
        let key = ServiceAccountKey::from_file(&self.config.credential_path).map_err(|e| {
            self.stats.record_error();
            e
        })?;

        // 2. Authenticate and open the client, retrying transient failures
        let policy = RetryPolicy::from_config(&self.config);
        let connect_timeout = self.config.connect_timeout();
        let connect_timeout_secs = self.config.connect_timeout_secs;
        let database = self.config.database_name.as_str();
        let connector = self.connector.as_ref();
        let key = &key;

        let store = policy
            .run(
                "connect",
                |e: &ConnectError| {
                    self.stats.record_error();
                    tracing::warn!(
                        database = %database,
                        error = %e,
                        transient = e.is_transient(),
                        "firestore_connect_failed"
                    );
                },
                move || async move {
                    match timeout(connect_timeout, connector.connect(key, database)).await {
                        Ok(result) => result,
                        Err(_) => Err(ConnectError::Timeout(connect_timeout_secs)),
                    }
                },
            )
            .await
            .map_err(|failure| match failure.error {
                ConnectError::Authentication(reason) => ClientError::Authentication(reason),
                other => ClientError::InitializationFailed {
                    attempts: failure.attempts,
                    last_error: other.to_string(),
                },
            })?;

        // 3. Record and hand out
        tracing::info!(
            project_id = %key.project_id(),
            database = %database,
            "firestore_client_initialized"
        );

        Ok(ClientHandle {
            store,
            config: self.config.clone(),
            stats: self.stats.clone(),
            policy,
            project_id: key.project_id().to_string(),
        })
    }
}

impl std::fmt::Debug for ClientManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientManager")
            .field("database", &self.config.database_name)
            .field("initialized", &self.is_initialized())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

/// The process's client. Obtain one through [`ClientManager::acquire`].
pub struct ClientHandle {
    store: Arc<dyn DocumentStore>,
    config: Arc<AcdcnConfig>,
    stats: Arc<ConnectionStats>,
    policy: RetryPolicy,
    project_id: String,
}

impl ClientHandle {
    /// Fetch one document.
    pub async fn get_document(&self, collection: &str, id: &str) -> ClientResult<Option<Value>> {
        self.execute("get_document", || self.store.get(collection, id))
            .await
    }

    /// Create or replace one document.
    pub async fn set_document(&self, collection: &str, id: &str, data: Value) -> ClientResult<()> {
        self.execute("set_document", || self.store.set(collection, id, data.clone()))
            .await
    }

    /// Delete one document.
    pub async fn delete_document(&self, collection: &str, id: &str) -> ClientResult<()> {
        self.execute("delete_document", || self.store.delete(collection, id))
            .await
    }

    /// Commit `writes` in chunks of at most `batch_size`, in order.
    ///
    /// Counts as one operation however many chunks it takes. Returns the
    /// number of chunks committed. On failure, chunks before the failing one
    /// remain committed and [`ClientError::BatchFailed`] reports how many.
    pub async fn write_batch(&self, writes: Vec<WriteOp>) -> ClientResult<usize> {
        self.stats.record_operation();

        let mut committed_chunks = 0;
        let mut committed_writes = 0;

        for chunk in chunk_writes(&writes, self.config.batch_size) {
            if let Err(failure) = self.attempt("write_batch", || self.store.commit(chunk)).await {
                tracing::error!(
                    operation = "write_batch",
                    committed_chunks = committed_chunks,
                    committed_writes = committed_writes,
                    total_writes = writes.len(),
                    attempts = failure.attempts,
                    error = %failure.error,
                    "firestore_operation_failed"
                );
                return Err(ClientError::BatchFailed {
                    committed_chunks,
                    committed_writes,
                    attempts: failure.attempts,
                    source: failure.error,
                });
            }
            metrics::record_batch_chunk(chunk.len());
            committed_chunks += 1;
            committed_writes += chunk.len();
        }

        tracing::debug!(
            chunks = committed_chunks,
            writes = committed_writes,
            "Batch write committed"
        );
        Ok(committed_chunks)
    }

    /// Probe the database once. Updates the health timestamp on success and
    /// marks the client degraded on failure.
    pub async fn health_check(&self) -> bool {
        let probe = timeout(self.config.operation_timeout(), self.store.ping()).await;
        let result = match probe {
            Ok(result) => result,
            Err(_) => Err(StoreError::DeadlineExceeded(self.config.operation_timeout_secs)),
        };

        match result {
            Ok(()) => {
                self.stats.record_healthy(SystemTime::now());
                true
            }
            Err(e) => {
                self.stats.record_error();
                self.stats.mark_degraded();
                tracing::warn!(error = %e, "firestore_health_check_failed");
                false
            }
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &AcdcnConfig {
        &self.config
    }

    /// Project the credentials belong to.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Run one logical operation under the timeout and retry budget.
    async fn execute<T, F, Fut>(&self, operation: &'static str, op: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        self.stats.record_operation();

        self.attempt(operation, op).await.map_err(|failure| {
            tracing::error!(
                operation = operation,
                attempts = failure.attempts,
                error = %failure.error,
                "firestore_operation_failed"
            );
            ClientError::OperationFailed {
                operation,
                attempts: failure.attempts,
                source: failure.error,
            }
        })
    }

    /// Retry `op` with a per-attempt timeout and keep the health state
    /// current. Does not count an operation.
    async fn attempt<T, F, Fut>(
        &self,
        operation: &'static str,
        mut op: F,
    ) -> Result<T, RetryFailure<StoreError>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let op_timeout = self.config.operation_timeout();
        let op_timeout_secs = self.config.operation_timeout_secs;

        let result = self
            .policy
            .run(
                operation,
                |_: &StoreError| self.stats.record_error(),
                || {
                    let pending = op();
                    async move {
                        match timeout(op_timeout, pending).await {
                            Ok(result) => result,
                            Err(_) => Err(StoreError::DeadlineExceeded(op_timeout_secs)),
                        }
                    }
                },
            )
            .await;

        match &result {
            Ok(_) => self.stats.mark_recovered(),
            Err(failure) if failure.error.is_transient() => self.stats.mark_degraded(),
            Err(_) => {}
        }
        result
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("project_id", &self.project_id)
            .field("database", &self.config.database_name)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
