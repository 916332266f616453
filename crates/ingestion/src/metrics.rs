//! Ingestion counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion metrics
///
/// Shared between the run loop and the end-of-run summary. Every update is
/// mirrored to the Prometheus facade.
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Records decoded and appended
    pub records_ingested: AtomicU64,

    /// Messages skipped as undecodable or unrenderable
    pub decode_errors: AtomicU64,

    /// Polls that reported a client error
    pub poll_errors: AtomicU64,

    /// Polls that timed out without a message
    pub empty_polls: AtomicU64,
}

impl IngestionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ingested(&self) {
        self.records_ingested.fetch_add(1, Ordering::Relaxed);
        observability::record_record_ingested();
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
        observability::record_decode_error();
    }

    pub fn record_poll_error(&self) {
        self.poll_errors.fetch_add(1, Ordering::Relaxed);
        observability::record_poll_error();
    }

    pub fn record_empty_poll(&self) {
        self.empty_polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> IngestionSnapshot {
        IngestionSnapshot {
            records_ingested: self.records_ingested.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            poll_errors: self.poll_errors.load(Ordering::Relaxed),
            empty_polls: self.empty_polls.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`IngestionMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionSnapshot {
    pub records_ingested: u64,
    pub decode_errors: u64,
    pub poll_errors: u64,
    pub empty_polls: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = IngestionMetrics::new();
        metrics.record_ingested();
        metrics.record_ingested();
        metrics.record_decode_error();
        metrics.record_empty_poll();

        let snap = metrics.snapshot();
        assert_eq!(snap.records_ingested, 2);
        assert_eq!(snap.decode_errors, 1);
        assert_eq!(snap.poll_errors, 0);
        assert_eq!(snap.empty_polls, 1);
    }
}
