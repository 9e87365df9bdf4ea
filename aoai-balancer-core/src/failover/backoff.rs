//! Delay applied between failover attempts
//!
//! The engine waits after every recoverable failure before moving to the next
//! endpoint. [`FixedBackoff`] is the default and always waits one second.
//! [`ExponentialBackoff`] is available for deployments that want the delay to
//! grow with the attempt index; it is never selected implicitly.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default delay between failover attempts
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(1000);

/// Strategy deciding how long to wait before the next endpoint is tried
#[async_trait]
pub trait BackoffPolicy: Send + Sync {
    /// Delay after the failure of the attempt at `attempt` (0-based)
    fn delay(&self, attempt: usize) -> Duration;

    /// Suspend the calling task for [`delay`](Self::delay) without blocking the runtime
    async fn wait(&self, attempt: usize) {
        tokio::time::sleep(self.delay(attempt)).await;
    }
}

/// Same delay after every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF)
    }
}

#[async_trait]
impl BackoffPolicy for FixedBackoff {
    fn delay(&self, _attempt: usize) -> Duration {
        self.delay
    }
}

/// Exponential backoff with optional jitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExponentialBackoff {
    /// Delay after the first failure (milliseconds)
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay (milliseconds)
    pub max_delay_ms: u64,

    /// Growth factor per attempt (e.g., 2.0 for doubling)
    pub exponential_base: f64,

    /// Jitter factor (0.0 to 1.0) to randomize delays
    pub jitter_factor: f64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
            exponential_base: 2.0,
            jitter_factor: 0.1,
        }
    }
}

#[async_trait]
impl BackoffPolicy for ExponentialBackoff {
    fn delay(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay_ms as f64 * self.exponential_base.powi(exponent);
        // Non-negative whatever the public fields hold
        let capped_delay = base_delay.min(self.max_delay_ms as f64).max(0.0);

        let delay_with_jitter = if self.jitter_factor > 0.0 && capped_delay > 0.0 {
            let mut rng = rand::thread_rng();
            let jitter_range = capped_delay * self.jitter_factor.min(1.0);
            let jitter = rng.gen_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        Duration::from_millis(delay_with_jitter as u64)
    }
}
