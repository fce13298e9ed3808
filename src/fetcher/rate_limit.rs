//! Sliding-window rate limiting for provider calls
//!
//! Each source gets its own limiter. The limiter remembers when recent slots
//! were granted; on every acquisition it drops timestamps that have left the
//! window and, if the window is still full, sleeps until the oldest one leaves.

use crate::config::{validate_rate_limit_config, RateLimitConfig};
use crate::ConfigError;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Per-source sliding-window limiter
///
/// The prune-check-record sequence runs under one async mutex, so concurrent
/// callers queue in arrival order and can never both take the last slot.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    interval: Duration,
    granted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter
    ///
    /// # Returns
    ///
    /// * `Err(ConfigError::Validation)` - `max_requests` is 0, which would
    ///   block every caller forever
    pub fn new(config: RateLimitConfig) -> Result<Self, ConfigError> {
        validate_rate_limit_config(&config)?;

        Ok(Self {
            max_requests: config.max_requests as usize,
            interval: Duration::from_millis(config.interval_ms),
            granted: Mutex::new(VecDeque::with_capacity(config.max_requests as usize)),
        })
    }

    /// Waits until a slot is free, then records the acquisition
    pub async fn acquire(&self) {
        let mut granted = self.granted.lock().await;

        loop {
            let now = Instant::now();
            prune(&mut granted, now, self.interval);

            if granted.len() < self.max_requests {
                granted.push_back(now);
                return;
            }

            // The window is full, so there is at least one timestamp
            let Some(&oldest) = granted.front() else {
                continue;
            };
            let wait = self.interval.saturating_sub(now.duration_since(oldest));

            tracing::debug!(
                "Rate limit reached ({} per {:?}), waiting {:?}",
                self.max_requests,
                self.interval,
                wait
            );
            tokio::time::sleep(wait).await;
        }
    }
}

/// Drops timestamps that are at least one interval old
fn prune(granted: &mut VecDeque<Instant>, now: Instant, interval: Duration) {
    while let Some(&oldest) = granted.front() {
        if now.duration_since(oldest) >= interval {
            granted.pop_front();
        } else {
            break;
        }
    }
}
