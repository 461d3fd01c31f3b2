//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failure is worth another attempt
//! - Execute attempts with exponential backoff + jitter between them
//! - Enforce the attempt budget (`max_retry_attempts`, first try included)
//!
//! # Design Decisions
//! - Only transient failures are retried; permanent ones return at once
//! - Every failed attempt is reported to the caller's hook, retried or not

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::config::AcdcnConfig;
use crate::resilience::backoff::Backoff;

/// Classifies an error as transient (worth retrying) or permanent.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

/// Attempt budget and backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included. Treated as at least 1.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// The final error of a retried operation and how many attempts it took.
#[derive(Debug)]
pub struct RetryFailure<E> {
    pub attempts: u32,
    pub error: E,
}

impl RetryPolicy {
    pub fn from_config(config: &AcdcnConfig) -> Self {
        Self {
            max_attempts: config.max_retry_attempts,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }

    /// Delay before the next attempt, given how many have failed.
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        Backoff::new(self.base_delay_ms, self.max_delay_ms).delay(failed_attempts)
    }

    /// Run `op` until it succeeds, fails permanently, or the budget is spent.
    ///
    /// `on_error` sees every failed attempt.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        mut on_error: impl FnMut(&E),
        mut op: F,
    ) -> Result<T, RetryFailure<E>>
    where
        E: Retryable + fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            on_error(&error);

            if !error.is_transient() || attempt >= max_attempts {
                return Err(RetryFailure { attempts: attempt, error });
            }

            let delay = self.delay_after(attempt);
            tracing::warn!(
                operation = %operation,
                attempt = attempt,
                max_attempts = max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "firestore_operation_retry"
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}
