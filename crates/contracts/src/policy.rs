//! Flush policy - trigger thresholds shared by the batch buffer and coordinator.

use std::time::Duration;

/// Default row-count threshold
pub const DEFAULT_BATCH_MAX: usize = 50_000;
/// Default minimum flush interval in seconds
pub const DEFAULT_FLUSH_SECONDS: u64 = 60;
/// Default fixed delay after a non-overload send failure, in seconds
pub const DEFAULT_RETRY_DELAY_SECONDS: u64 = 5;

/// Flush trigger and backoff parameters
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    /// Row count at which a batch is due regardless of age
    pub max_batch_size: usize,

    /// Age at which a non-empty batch is due; also the minimum spacing
    /// between two sends and the overload cooldown granularity
    pub min_flush_interval: Duration,

    /// Fixed wait after a send failure that is not an overload
    pub retry_delay: Duration,
}

impl FlushPolicy {
    pub fn new(max_batch_size: usize, min_flush_interval: Duration) -> Self {
        Self {
            max_batch_size,
            min_flush_interval,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECONDS),
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_BATCH_MAX,
            Duration::from_secs(DEFAULT_FLUSH_SECONDS),
        )
    }
}
