//! In-process document store.
//!
//! Implements the SDK seam without a network so the rest of the stack can run
//! in local development and tests. Failures can be queued up front to
//! exercise the retry and health paths.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::database::connector::{Connector, DocumentStore};
use crate::database::credentials::ServiceAccountKey;
use crate::database::types::{ConnectError, StoreError, WriteOp};

type DocumentKey = (String, String);

/// A `DocumentStore` backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<DocumentKey, Value>>,
    faults: Mutex<VecDeque<StoreError>>,
    calls: AtomicU64,
    commits: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue errors returned by the next calls, one per call, in order.
    pub fn inject_failures(&self, errors: impl IntoIterator<Item = StoreError>) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(errors);
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls received, failed ones included.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Batches applied successfully.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    fn begin_call(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self
            .faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn key(collection: &str, id: &str) -> Result<DocumentKey, StoreError> {
    if collection.is_empty() || id.is_empty() || collection.contains('/') || id.contains('/') {
        return Err(StoreError::InvalidArgument(format!(
            "invalid document path {}/{}",
            collection, id
        )));
    }
    Ok((collection.to_string(), id.to_string()))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.begin_call()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.begin_call()?;
        let key = key(collection, id)?;
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(&key).cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.begin_call()?;
        let key = key(collection, id)?;
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, data);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.begin_call()?;
        let key = key(collection, id)?;
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }

    async fn commit(&self, writes: &[WriteOp]) -> Result<(), StoreError> {
        self.begin_call()?;

        // Validate everything before touching the map so a bad write applies nothing.
        let mut staged = Vec::with_capacity(writes.len());
        for write in writes {
            match write {
                WriteOp::Set { collection, id, data } => {
                    staged.push((key(collection, id)?, Some(data.clone())))
                }
                WriteOp::Delete { collection, id } => staged.push((key(collection, id)?, None)),
            }
        }

        let mut documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, data) in staged {
            match data {
                Some(data) => {
                    documents.insert(key, data);
                }
                None => {
                    documents.remove(&key);
                }
            }
        }
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// A `Connector` that hands out one shared [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    faults: Mutex<VecDeque<ConnectError>>,
    connects: AtomicU32,
    connect_delay: Duration,
    expected_project: Option<String>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            faults: Mutex::new(VecDeque::new()),
            connects: AtomicU32::new(0),
            connect_delay: Duration::ZERO,
            expected_project: None,
        }
    }

    /// Sleep this long inside every connect call.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Reject keys for any other project with an authentication error.
    pub fn expecting_project(mut self, project_id: impl Into<String>) -> Self {
        self.expected_project = Some(project_id.into());
        self
    }

    /// Queue errors returned by the next connect calls, in order.
    pub fn inject_failures(&self, errors: impl IntoIterator<Item = ConnectError>) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(errors);
    }

    /// Connect calls received, failed ones included.
    pub fn connect_count(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        key: &ServiceAccountKey,
        database: &str,
    ) -> Result<Arc<dyn DocumentStore>, ConnectError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }

        let fault = self
            .faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(e) = fault {
            return Err(e);
        }

        if let Some(expected) = &self.expected_project {
            if key.project_id() != expected {
                return Err(ConnectError::Authentication(format!(
                    "key for project {} cannot access project {}",
                    key.project_id(),
                    expected
                )));
            }
        }

        tracing::debug!(project_id = %key.project_id(), database = %database, "In-memory store connected");
        Ok(self.store.clone())
    }
}
