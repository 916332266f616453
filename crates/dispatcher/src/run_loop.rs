//! RunLoop - wires source, transformer and coordinator under a shutdown token
//!
//! One task owns everything, so no locking is needed and a batch is never
//! in flight while records are being accumulated. Cancellation is observed
//! between steps; only idle waits are cut short by it.

use std::sync::Arc;
use std::time::Duration;

use contracts::{BulkSink, LogSource, PollOutcome};
use ingestion::{render_row, IngestionMetrics, IngestionSnapshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::coordinator::{FlushCoordinator, FlushOutcome};
use crate::metrics::FlushStats;

/// Summary returned when the loop exits
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ingestion: IngestionSnapshot,
    pub flush: FlushStats,
    /// Outcome of the shutdown flush attempt
    pub final_flush: FlushOutcome,
    /// Rows neither accepted nor committed at exit
    pub rows_left: usize,
    pub duration: Duration,
}

/// The forwarding loop
pub struct RunLoop<L, S> {
    source: L,
    coordinator: FlushCoordinator<S>,
    poll_timeout: Duration,
    metrics: Arc<IngestionMetrics>,
}

impl<L: LogSource, S: BulkSink> RunLoop<L, S> {
    pub fn new(source: L, coordinator: FlushCoordinator<S>, poll_timeout: Duration) -> Self {
        Self {
            source,
            coordinator,
            poll_timeout,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Share ingestion counters with the caller
    pub fn with_metrics(mut self, metrics: Arc<IngestionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<IngestionMetrics> {
        &self.metrics
    }

    /// Run until `cancel` fires, then make one final flush attempt
    #[instrument(
        name = "run_loop",
        skip(self, cancel),
        fields(source = %self.source.name(), sink = %self.coordinator.sink().name())
    )]
    pub async fn run(mut self, cancel: CancellationToken) -> RunSummary {
        let started = Instant::now();
        info!(
            poll_timeout_ms = self.poll_timeout.as_millis() as u64,
            max_batch_size = self.coordinator.policy().max_batch_size,
            flush_interval_secs = self.coordinator.policy().min_flush_interval.as_secs(),
            "Run loop started"
        );

        while !cancel.is_cancelled() {
            // time-based flush, also retries after a backoff expired
            self.coordinator
                .evaluate(Instant::now(), &mut self.source)
                .await;

            if self.coordinator.is_saturated() {
                self.pause_admission(&cancel).await;
                continue;
            }

            match self.source.poll(self.poll_timeout).await {
                PollOutcome::Record(record) => match render_row(&record.record) {
                    Ok(row) => {
                        self.coordinator
                            .append(row, Some(record.position), Instant::now());
                        self.metrics.record_ingested();
                        trace!(position = %record.position, "Record buffered");
                    }
                    Err(e) => {
                        self.metrics.record_decode_error();
                        warn!(position = %record.position, error = %e, "Skipping unrenderable record");
                    }
                },
                PollOutcome::Empty => self.metrics.record_empty_poll(),
                PollOutcome::Malformed { position, reason } => {
                    self.metrics.record_decode_error();
                    warn!(
                        position = %position.map(|p| p.to_string()).unwrap_or_default(),
                        reason = %reason,
                        "Skipping malformed record"
                    );
                }
                PollOutcome::Transport(message) => {
                    self.metrics.record_poll_error();
                    warn!(error = %message, "Poll failed");
                }
            }

            // size-based flush
            self.coordinator
                .evaluate(Instant::now(), &mut self.source)
                .await;
        }

        info!(
            buffered = self.coordinator.batch().len(),
            "Shutdown requested, attempting final flush"
        );
        let final_flush = self
            .coordinator
            .final_flush(Instant::now(), &mut self.source)
            .await;
        let rows_left = self.coordinator.batch().len();
        if rows_left > 0 {
            warn!(rows = rows_left, "Exiting with unflushed rows, they will be replayed");
        }

        let (_, flush) = self.coordinator.into_parts();
        let summary = RunSummary {
            ingestion: self.metrics.snapshot(),
            flush,
            final_flush,
            rows_left,
            duration: started.elapsed(),
        };
        info!(
            records = summary.ingestion.records_ingested,
            flushes = summary.flush.flushes,
            rows_flushed = summary.flush.rows_flushed,
            "Run loop stopped"
        );
        summary
    }

    /// Buffer is full: stop polling until the flush window or backoff opens
    async fn pause_admission(&mut self, cancel: &CancellationToken) {
        let Some(pause) = self.coordinator.admission_pause(Instant::now()) else {
            return;
        };

        debug!(
            buffered = self.coordinator.batch().len(),
            wait_ms = pause.as_millis() as u64,
            "Batch full, pausing admission"
        );
        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            _ = cancel.cancelled() => {}
        }
    }
}
