//! FlushCoordinator - decides when a batch is sent and when offsets move
//!
//! States:
//! - `Idle`: nothing buffered
//! - `Accumulating`: rows buffered, no overload cooldown
//! - `CoolingDown`: rows buffered, downstream overloaded, waiting for `until`
//!
//! Evaluation order: empty buffer, active backoff, trigger predicate, flush
//! window. Only an accepted send clears the batch and commits offsets; both
//! failure paths keep every row.

use std::time::Duration;

use contracts::{BulkSink, FlushPolicy, LogSource, RenderedRow, SendError, SourcePosition};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::backoff::Backoff;
use crate::batch::Batch;
use crate::metrics::FlushStats;

/// Coarse coordinator state at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Accumulating,
    CoolingDown { until: Instant },
}

/// Result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing buffered
    Empty,
    /// A cooldown or retry deadline is in force
    BackingOff { until: Instant },
    /// Neither the size nor the age trigger holds
    NotDue,
    /// Due, but the previous flush was less than one interval ago
    WindowClosed { opens_at: Instant },
    /// Batch accepted; `committed` tells whether the commit went through
    Flushed { rows: usize, committed: bool },
    /// Downstream overloaded; batch kept until `until`
    Overloaded { until: Instant },
    /// Other failure; batch kept, next attempt at `retry_at`
    Failed { retry_at: Instant },
}

impl FlushOutcome {
    pub fn is_flushed(&self) -> bool {
        matches!(self, Self::Flushed { .. })
    }
}

/// Owner of the batch, the backoff state and the sink
pub struct FlushCoordinator<S> {
    sink: S,
    policy: FlushPolicy,
    batch: Batch,
    backoff: Backoff,
    last_flush: Option<Instant>,
    stats: FlushStats,
}

impl<S: BulkSink> FlushCoordinator<S> {
    pub fn new(sink: S, policy: FlushPolicy) -> Self {
        Self {
            sink,
            batch: Batch::with_capacity(policy.max_batch_size.min(64 * 1024)),
            policy,
            backoff: Backoff::Clear,
            last_flush: None,
            stats: FlushStats::new(),
        }
    }

    /// Buffer one rendered row
    pub fn append(&mut self, row: RenderedRow, position: Option<SourcePosition>, now: Instant) {
        self.batch.append(row, position, now);
        observability::record_buffered_rows(self.batch.len());
    }

    /// Flush if due, honouring backoff and the flush window
    #[instrument(
        name = "coordinator_evaluate",
        level = "trace",
        skip(self, source),
        fields(buffered = self.batch.len())
    )]
    pub async fn evaluate<L: LogSource>(&mut self, now: Instant, source: &mut L) -> FlushOutcome {
        if self.batch.is_empty() {
            return FlushOutcome::Empty;
        }
        if let Some(until) = self.backoff.blocked_until(now) {
            return FlushOutcome::BackingOff { until };
        }
        if !self.batch.should_flush(now, &self.policy) {
            return FlushOutcome::NotDue;
        }
        if let Some(opens_at) = self.window_opens_at(now) {
            return FlushOutcome::WindowClosed { opens_at };
        }

        self.send(now, source).await
    }

    /// Best-effort last attempt on shutdown
    ///
    /// Ignores the triggers and the flush window, but not an active cooldown
    /// or retry deadline. Rows that are not accepted stay uncommitted and
    /// are replayed after restart.
    #[instrument(name = "coordinator_final_flush", skip(self, source), fields(buffered = self.batch.len()))]
    pub async fn final_flush<L: LogSource>(&mut self, now: Instant, source: &mut L) -> FlushOutcome {
        if self.batch.is_empty() {
            return FlushOutcome::Empty;
        }
        if let Some(until) = self.backoff.blocked_until(now) {
            warn!(
                rows = self.batch.len(),
                wait_ms = until.saturating_duration_since(now).as_millis() as u64,
                "Skipping final flush while backing off, rows stay uncommitted"
            );
            return FlushOutcome::BackingOff { until };
        }

        self.send(now, source).await
    }

    async fn send<L: LogSource>(&mut self, now: Instant, source: &mut L) -> FlushOutcome {
        let rows = self.batch.len();
        self.stats.attempts += 1;
        debug!(
            sink = %self.sink.name(),
            rows,
            offsets = %self.batch.span(),
            "Sending batch"
        );

        let started = Instant::now();
        let result = self.sink.send(self.batch.rows()).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.stats.record_latency(elapsed_ms);

        match result {
            Ok(()) => self.on_success(now, rows, elapsed_ms, source).await,
            Err(e) => {
                observability::record_send_failure(self.sink.name(), e.kind(), elapsed_ms);
                self.on_failure(now, e)
            }
        }
    }

    async fn on_success<L: LogSource>(
        &mut self,
        now: Instant,
        rows: usize,
        elapsed_ms: f64,
        source: &mut L,
    ) -> FlushOutcome {
        self.batch.clear();
        self.last_flush = Some(now);
        self.backoff = Backoff::Clear;
        self.stats.flushes += 1;
        self.stats.rows_flushed += rows as u64;
        observability::record_flush(self.sink.name(), rows, elapsed_ms);
        observability::record_buffered_rows(0);
        observability::record_cooldown_ms(0);

        info!(sink = %self.sink.name(), rows, elapsed_ms, "Batch flushed");

        let committed = match source.commit_current().await {
            Ok(()) => {
                self.stats.commits += 1;
                true
            }
            Err(e) => {
                self.stats.commit_failures += 1;
                warn!(
                    source = %source.name(),
                    error = %e,
                    "Offset commit failed, next successful flush will retry"
                );
                false
            }
        };
        observability::record_commit(committed);

        FlushOutcome::Flushed { rows, committed }
    }

    fn on_failure(&mut self, now: Instant, err: SendError) -> FlushOutcome {
        if err.is_overload() {
            self.stats.overloads += 1;
            self.backoff =
                Backoff::after_overload(self.last_flush, now, self.policy.min_flush_interval);
            let until = self.backoff.cooldown_until(now).unwrap_or(now);
            let wait_ms = until.saturating_duration_since(now).as_millis() as u64;
            observability::record_cooldown_ms(wait_ms);

            info!(
                sink = %self.sink.name(),
                rows = self.batch.len(),
                wait_ms,
                error = %err,
                "Downstream overloaded, holding batch until next flush window"
            );
            return FlushOutcome::Overloaded { until };
        }

        self.stats.other_failures += 1;
        self.backoff = Backoff::after_failure(now, self.policy.retry_delay);
        let retry_at = now + self.policy.retry_delay;

        error!(
            sink = %self.sink.name(),
            rows = self.batch.len(),
            retry_in_ms = self.policy.retry_delay.as_millis() as u64,
            error = %err,
            "Batch send failed, will retry"
        );
        FlushOutcome::Failed { retry_at }
    }

    /// Opening of the flush window when it is still closed at `now`
    fn window_opens_at(&self, now: Instant) -> Option<Instant> {
        let opens_at = self.last_flush? + self.policy.min_flush_interval;
        (now < opens_at).then_some(opens_at)
    }

    pub fn state(&self, now: Instant) -> CoordinatorState {
        if self.batch.is_empty() {
            return CoordinatorState::Idle;
        }
        match self.backoff.cooldown_until(now) {
            Some(until) => CoordinatorState::CoolingDown { until },
            None => CoordinatorState::Accumulating,
        }
    }

    /// Buffer reached `max_batch_size`; admission must pause
    pub fn is_saturated(&self) -> bool {
        self.batch.is_full(&self.policy)
    }

    /// Earliest instant a saturated buffer may be flushed, `None` when it may
    /// be flushed now (or is not saturated)
    pub fn resume_at(&self, now: Instant) -> Option<Instant> {
        if !self.is_saturated() {
            return None;
        }
        let backoff = self.backoff.blocked_until(now);
        let window = self.window_opens_at(now);
        match (backoff, window) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Time left until a saturated buffer may be flushed
    pub fn admission_pause(&self, now: Instant) -> Option<Duration> {
        self.resume_at(now)
            .map(|at| at.saturating_duration_since(now))
    }

    pub fn policy(&self) -> &FlushPolicy {
        &self.policy
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    pub fn last_flush(&self) -> Option<Instant> {
        self.last_flush
    }

    pub fn stats(&self) -> &FlushStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the coordinator, returning the sink and final statistics
    pub fn into_parts(self) -> (S, FlushStats) {
        (self.sink, self.stats)
    }
}
