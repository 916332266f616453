//! Flush statistics for the end-of-run summary

use observability::{RunningStats, StatsSummary};

/// Counters kept by the flush coordinator
#[derive(Debug, Clone, Default)]
pub struct FlushStats {
    /// Send attempts, successful or not
    pub attempts: u64,
    /// Accepted batches
    pub flushes: u64,
    /// Rows in accepted batches
    pub rows_flushed: u64,
    /// Attempts answered with an overload status
    pub overloads: u64,
    /// Attempts that failed any other way
    pub other_failures: u64,
    /// Successful offset commits
    pub commits: u64,
    /// Failed offset commits (logged, not retried)
    pub commit_failures: u64,
    send_latency_ms: RunningStats,
}

impl FlushStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_latency(&mut self, ms: f64) {
        self.send_latency_ms.push(ms);
    }

    /// Send latency summary in milliseconds
    pub fn send_latency(&self) -> StatsSummary {
        self.send_latency_ms.summary()
    }

    /// Snapshot of the plain counters
    pub fn snapshot(&self) -> FlushSnapshot {
        FlushSnapshot {
            attempts: self.attempts,
            flushes: self.flushes,
            rows_flushed: self.rows_flushed,
            overloads: self.overloads,
            other_failures: self.other_failures,
            commits: self.commits,
            commit_failures: self.commit_failures,
        }
    }
}

/// Counter snapshot, comparable in tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSnapshot {
    pub attempts: u64,
    pub flushes: u64,
    pub rows_flushed: u64,
    pub overloads: u64,
    pub other_failures: u64,
    pub commits: u64,
    pub commit_failures: u64,
}
