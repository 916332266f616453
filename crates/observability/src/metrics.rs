//! Anonymizer metrics
//!
//! Thin wrappers over the `metrics` facade so metric names and labels live
//! in one place. Without an installed recorder every call is a no-op.

use contracts::SendFailureKind;
use metrics::{counter, gauge, histogram};

/// One record decoded and appended to the batch
pub fn record_record_ingested() {
    counter!("anonymizer_records_ingested_total").increment(1);
}

/// One message skipped because it could not be decoded or rendered
pub fn record_decode_error() {
    counter!("anonymizer_decode_errors_total").increment(1);
}

/// One poll that reported a client error
pub fn record_poll_error() {
    counter!("anonymizer_poll_errors_total").increment(1);
}

/// Successful bulk send
pub fn record_flush(sink_name: &str, rows: usize, duration_ms: f64) {
    counter!(
        "anonymizer_flushes_total",
        "sink" => sink_name.to_string(),
        "status" => "success"
    )
    .increment(1);
    counter!("anonymizer_rows_flushed_total").increment(rows as u64);
    histogram!("anonymizer_flush_duration_ms").record(duration_ms);
}

/// Failed bulk send, labelled with the backoff path it takes
pub fn record_send_failure(sink_name: &str, kind: SendFailureKind, duration_ms: f64) {
    counter!(
        "anonymizer_flushes_total",
        "sink" => sink_name.to_string(),
        "status" => "failure"
    )
    .increment(1);
    counter!("anonymizer_send_failures_total", "kind" => kind.as_str()).increment(1);
    histogram!("anonymizer_flush_duration_ms").record(duration_ms);
}

/// Offset commit attempt after a successful send
pub fn record_commit(success: bool) {
    if !success {
        counter!("anonymizer_commit_failures_total").increment(1);
    }
}

/// Rows currently held in the batch
pub fn record_buffered_rows(rows: usize) {
    gauge!("anonymizer_buffered_rows").set(rows as f64);
}

/// Remaining overload cooldown (0 when not cooling down)
pub fn record_cooldown_ms(ms: u64) {
    gauge!("anonymizer_cooldown_ms").set(ms as f64);
}

/// Statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean / variance (Welford's algorithm)
///
/// Used for send latency in the end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}
