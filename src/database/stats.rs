//! Client operational counters and state.
//!
//! # Responsibilities
//! - Count operations and failed attempts
//! - Remember when the last health probe succeeded
//! - Track the client lifecycle state
//!
//! Counters only ever grow; nothing here is reset during the process's life.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::database::types::ClientState;
use crate::observability::metrics;

/// Shared, lock-free counters for the managed client.
#[derive(Debug)]
pub struct ConnectionStats {
    error_count: AtomicU64,
    total_operations: AtomicU64,
    /// Milliseconds since the epoch; 0 means never.
    last_healthy_check_ms: AtomicU64,
    state: AtomicU8,
}

/// Point-in-time copy of [`ConnectionStats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub error_count: u64,
    pub total_operations: u64,
    pub last_healthy_check: Option<SystemTime>,
    pub state: ClientState,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self {
            error_count: AtomicU64::new(0),
            total_operations: AtomicU64::new(0),
            last_healthy_check_ms: AtomicU64::new(0),
            state: AtomicU8::new(ClientState::Uninitialized as u8),
        }
    }

    /// Count one logical operation.
    pub fn record_operation(&self) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
        metrics::record_operation();
    }

    /// Count one failed attempt.
    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
        metrics::record_error();
    }

    /// Record a successful health probe at `at`.
    pub fn record_healthy(&self, at: SystemTime) {
        let millis = at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        // Never move backwards, and keep 0 reserved for "never".
        self.last_healthy_check_ms
            .fetch_max(millis.max(1), Ordering::Relaxed);
        self.set_state(ClientState::Ready);
    }

    pub fn state(&self) -> ClientState {
        ClientState::from(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: ClientState) {
        let previous = ClientState::from(self.state.swap(state as u8, Ordering::AcqRel));
        if previous != state {
            tracing::debug!(from = ?previous, to = ?state, "Client state changed");
            metrics::record_client_health(state == ClientState::Ready);
        }
    }

    /// `Ready -> Degraded`; other states are left alone.
    pub fn mark_degraded(&self) {
        if self
            .state
            .compare_exchange(
                ClientState::Ready as u8,
                ClientState::Degraded as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            tracing::warn!("Client degraded");
            metrics::record_client_health(false);
        }
    }

    /// `Degraded -> Ready`; other states are left alone.
    pub fn mark_recovered(&self) {
        if self
            .state
            .compare_exchange(
                ClientState::Degraded as u8,
                ClientState::Ready as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            tracing::info!("Client recovered");
            metrics::record_client_health(true);
        }
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn total_operations(&self) -> u64 {
        self.total_operations.load(Ordering::Relaxed)
    }

    pub fn last_healthy_check(&self) -> Option<SystemTime> {
        match self.last_healthy_check_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(UNIX_EPOCH + Duration::from_millis(ms)),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            error_count: self.error_count(),
            total_operations: self.total_operations(),
            last_healthy_check: self.last_healthy_check(),
            state: self.state(),
        }
    }
}

impl Default for ConnectionStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = ConnectionStats::new();
        stats.record_operation();
        stats.record_operation();
        stats.record_error();

        let snap = stats.snapshot();
        assert_eq!(snap.total_operations, 2);
        assert_eq!(snap.error_count, 1);
        assert_eq!(snap.last_healthy_check, None);
        assert_eq!(snap.state, ClientState::Uninitialized);
    }

    #[test]
    fn test_healthy_check_is_monotonic() {
        let stats = ConnectionStats::new();
        let later = UNIX_EPOCH + Duration::from_secs(2_000);
        let earlier = UNIX_EPOCH + Duration::from_secs(1_000);

        stats.record_healthy(later);
        stats.record_healthy(earlier);
        assert_eq!(stats.last_healthy_check(), Some(later));
        assert_eq!(stats.state(), ClientState::Ready);
    }

    #[test]
    fn test_degrade_and_recover() {
        let stats = ConnectionStats::new();

        // Not connected yet: nothing to degrade.
        stats.mark_degraded();
        assert_eq!(stats.state(), ClientState::Uninitialized);

        stats.set_state(ClientState::Ready);
        stats.mark_degraded();
        assert_eq!(stats.state(), ClientState::Degraded);

        stats.mark_recovered();
        assert_eq!(stats.state(), ClientState::Ready);
    }

    #[test]
    fn test_concurrent_increments() {
        let stats = std::sync::Arc::new(ConnectionStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_operation();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.total_operations(), 8000);
    }
}
