//! Backoff between attempts of a Lotus request.
//!
//! Only the transport retries. A sync status check itself is one query; if
//! the node keeps failing, the caller sees `UnableToGetSyncStatus`.

use std::time::Duration;

/// How often and how patiently [`LotusClient`](crate::LotusClient) retries a
/// request that failed with a transient error.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Extra attempts after the first one. `0` disables retrying.
    pub max_retries: u32,
    /// Wait before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound on any single wait.
    pub max_backoff: Duration,
    /// Growth factor of the wait from one retry to the next.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A config that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Computes waits from a [`RetryConfig`]; holds no per-request state.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Wait after the `attempt`-th failed attempt (1-based). `None` means the
    /// request has used up its retries and the error should be returned.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.config.max_retries {
            return None;
        }
        let base_ms = self.config.initial_backoff.as_millis() as f64
            * self.config.multiplier.powi((attempt - 1) as i32);
        let cap_ms = self.config.max_backoff.as_millis() as f64;
        Some(Duration::from_millis(base_ms.min(cap_ms) as u64))
    }

    /// Sum of every wait a request can go through before giving up.
    pub fn total_backoff(&self) -> Duration {
        (1..=self.config.max_retries)
            .filter_map(|attempt| self.next_delay(attempt))
            .sum()
    }
}
