//! Exponential backoff retry for provider calls
//!
//! The backoff schedule lives in a small `BackoffState` value that is advanced
//! explicitly after each failure, so the delay arithmetic can be tested without
//! running any operation.

use crate::config::{validate_retry_config, RetryConfig};
use crate::ConfigError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry limits and backoff shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    /// Builds a validated policy from configuration
    pub fn from_config(config: &RetryConfig) -> Result<Self, ConfigError> {
        validate_retry_config(config)?;

        Ok(Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_factor: config.backoff_factor,
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2.0,
        }
    }
}

/// Position within one retried call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffState {
    /// 1-based number of the attempt about to run
    pub attempt: u32,

    /// Delay to sleep if this attempt fails
    pub delay: Duration,
}

impl BackoffState {
    pub fn initial(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 1,
            delay: policy.initial_delay,
        }
    }

    /// State for the next attempt, or `None` once attempts are exhausted
    ///
    /// The delay grows by the backoff factor and is capped at the maximum.
    pub fn next(&self, policy: &RetryPolicy) -> Option<Self> {
        if self.attempt >= policy.max_retries {
            return None;
        }

        let grown = Duration::try_from_secs_f64(self.delay.as_secs_f64() * policy.backoff_factor)
            .unwrap_or(policy.max_delay);

        Some(Self {
            attempt: self.attempt + 1,
            delay: grown.min(policy.max_delay),
        })
    }
}

/// Runs fallible async operations with exponential backoff
#[derive(Debug, Clone, Default)]
pub struct RetryManager {
    policy: RetryPolicy,
}

impl RetryManager {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(RetryPolicy::from_config(config)?))
    }

    /// Runs `operation` until it succeeds or attempts run out
    ///
    /// A success returns immediately. After the final failed attempt the error
    /// from that attempt is returned unchanged.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut state = BackoffState::initial(&self.policy);

        loop {
            match operation().await {
                Ok(value) => {
                    if state.attempt > 1 {
                        tracing::debug!(attempt = state.attempt, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => match state.next(&self.policy) {
                    Some(next) => {
                        tracing::warn!(
                            attempt = state.attempt,
                            delay_ms = state.delay.as_millis() as u64,
                            "Attempt failed, retrying: {}",
                            err
                        );
                        tokio::time::sleep(state.delay).await;
                        state = next;
                    }
                    None => {
                        tracing::error!(
                            attempt = state.attempt,
                            "Giving up after {} attempts: {}",
                            state.attempt,
                            err
                        );
                        return Err(err);
                    }
                },
            }
        }
    }
}
