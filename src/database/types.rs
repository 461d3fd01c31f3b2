//! Database types and error definitions.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::resilience::Retryable;

/// Errors reported by a [`crate::database::DocumentStore`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The service could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The attempt did not finish before its deadline.
    #[error("deadline exceeded after {0} seconds")]
    DeadlineExceeded(u64),

    /// Quota or rate limit hit.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Retryable for StoreError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_)
                | StoreError::DeadlineExceeded(_)
                | StoreError::ResourceExhausted(_)
        )
    }
}

/// Errors reported by a [`crate::database::Connector`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// The service rejected the credentials.
    #[error("authentication rejected: {0}")]
    Authentication(String),

    /// The service could not be reached.
    #[error("connection failed: {0}")]
    Unavailable(String),

    #[error("connection attempt timed out after {0} seconds")]
    Timeout(u64),
}

impl Retryable for ConnectError {
    fn is_transient(&self) -> bool {
        !matches!(self, ConnectError::Authentication(_))
    }
}

/// Errors surfaced by [`crate::database::ClientManager`] and
/// [`crate::database::ClientHandle`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The credential file could not be read or is not a service-account key.
    #[error("malformed credentials in {}: {reason}", .path.display())]
    MalformedCredentials { path: PathBuf, reason: String },

    /// The service rejected the credentials. Not retried.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Every connection attempt failed.
    #[error("client initialization failed after {attempts} attempt(s): {last_error}")]
    InitializationFailed { attempts: u32, last_error: String },

    /// An operation failed permanently or exhausted its retries.
    #[error("{operation} failed after {attempts} attempt(s): {source}")]
    OperationFailed {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// A chunk of a batched write failed. Earlier chunks stay committed.
    #[error(
        "write_batch stopped after {committed_chunks} chunk(s) ({committed_writes} write(s)) \
         committed; next chunk failed after {attempts} attempt(s): {source}"
    )]
    BatchFailed {
        committed_chunks: usize,
        committed_writes: usize,
        attempts: u32,
        #[source]
        source: StoreError,
    },
}

impl ClientError {
    /// The underlying store error, for operation and batch failures.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ClientError::OperationFailed { source, .. }
            | ClientError::BatchFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// A single write within a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or replace a document.
    Set {
        collection: String,
        id: String,
        data: Value,
    },
    /// Remove a document. Removing a missing document is not an error.
    Delete { collection: String, id: String },
}

impl WriteOp {
    pub fn set(collection: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        WriteOp::Set {
            collection: collection.into(),
            id: id.into(),
            data,
        }
    }

    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        WriteOp::Delete {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

/// Lifecycle state of the managed client.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Uninitialized = 0,
    Initializing = 1,
    Ready = 2,
    /// Connected, but the last probe or operation failed.
    Degraded = 3,
}

impl From<u8> for ClientState {
    fn from(val: u8) -> Self {
        match val {
            1 => ClientState::Initializing,
            2 => ClientState::Ready,
            3 => ClientState::Degraded,
            _ => ClientState::Uninitialized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_classification() {
        assert!(StoreError::Unavailable("blip".into()).is_transient());
        assert!(StoreError::DeadlineExceeded(30).is_transient());
        assert!(StoreError::ResourceExhausted("quota".into()).is_transient());
        assert!(!StoreError::PermissionDenied("rules".into()).is_transient());
        assert!(!StoreError::InvalidArgument("path".into()).is_transient());
    }

    #[test]
    fn test_connect_error_classification() {
        assert!(!ConnectError::Authentication("bad key".into()).is_transient());
        assert!(ConnectError::Unavailable("dns".into()).is_transient());
        assert!(ConnectError::Timeout(10).is_transient());
    }

    #[test]
    fn test_state_round_trip() {
        for state in [
            ClientState::Uninitialized,
            ClientState::Initializing,
            ClientState::Ready,
            ClientState::Degraded,
        ] {
            assert_eq!(ClientState::from(state as u8), state);
        }
        assert_eq!(ClientState::from(42), ClientState::Uninitialized);
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::OperationFailed {
            operation: "set_document",
            attempts: 3,
            source: StoreError::Unavailable("reset".into()),
        };
        assert_eq!(
            err.to_string(),
            "set_document failed after 3 attempt(s): service unavailable: reset"
        );
        assert!(err.store_error().is_some());
    }

    #[test]
    fn test_batch_failure_reports_progress() {
        let err = ClientError::BatchFailed {
            committed_chunks: 2,
            committed_writes: 200,
            attempts: 1,
            source: StoreError::InvalidArgument("bad path".into()),
        };
        let message = err.to_string();
        assert!(message.starts_with("write_batch stopped after 2 chunk(s) (200 write(s)) committed"));
        assert_eq!(
            err.store_error(),
            Some(&StoreError::InvalidArgument("bad path".into()))
        );
    }
}
