//! LogSource trait - input side of the forwarder
//!
//! The forwarder only needs a bounded poll and a synchronous commit of the
//! consumed position. Connection handling and partition assignment stay
//! behind the implementation.

use std::time::Duration;

use crate::{CommitError, PollOutcome};

/// Partitioned, offset-addressable record source
#[trait_variant::make(LogSource: Send)]
pub trait LocalLogSource {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Wait at most `timeout` for the next record.
    ///
    /// Returns [`PollOutcome::Empty`] when the timeout elapses.
    async fn poll(&mut self, timeout: Duration) -> PollOutcome;

    /// Persist the position of every record returned so far, for all owned
    /// partitions.
    ///
    /// Must be idempotent: a second call with no poll in between commits the
    /// same position again.
    async fn commit_current(&mut self) -> Result<(), CommitError>;
}
