//! Pipeline statistics printed at shutdown.

use std::time::Duration;

use dispatcher::{FlushOutcome, FlushSnapshot, RunSummary};
use observability::StatsSummary;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Records decoded and buffered
    pub records_ingested: u64,

    /// Records skipped as undecodable
    pub decode_errors: u64,

    /// Polls that failed at the client
    pub poll_errors: u64,

    /// Flush coordinator counters
    pub flush: FlushSnapshot,

    /// Send latency in milliseconds
    pub send_latency: StatsSummary,

    /// Outcome of the shutdown flush
    pub final_flush: FlushOutcome,

    /// Rows left uncommitted at exit
    pub rows_left: usize,

    /// Total duration of the run
    pub duration: Duration,
}

impl From<RunSummary> for PipelineStats {
    fn from(summary: RunSummary) -> Self {
        Self {
            records_ingested: summary.ingestion.records_ingested,
            decode_errors: summary.ingestion.decode_errors,
            poll_errors: summary.ingestion.poll_errors,
            flush: summary.flush.snapshot(),
            send_latency: summary.flush.send_latency(),
            final_flush: summary.final_flush,
            rows_left: summary.rows_left,
            duration: summary.duration,
        }
    }
}

impl PipelineStats {
    /// Rows accepted downstream per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.flush.rows_flushed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Forwarder Statistics                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Records ingested: {}", self.records_ingested);
        println!("   ├─ Decode errors: {}", self.decode_errors);
        println!("   ├─ Poll errors: {}", self.poll_errors);
        println!("   └─ Rows/s: {:.2}", self.throughput());

        let flush = &self.flush;
        println!("\n📤 Flushes");
        println!("   ├─ Attempts: {}", flush.attempts);
        println!("   ├─ Accepted: {} ({} rows)", flush.flushes, flush.rows_flushed);
        println!("   ├─ Overloaded: {}", flush.overloads);
        println!("   ├─ Other failures: {}", flush.other_failures);
        println!(
            "   ├─ Commits: {} ({} failed)",
            flush.commits, flush.commit_failures
        );
        println!("   └─ Send latency (ms): {}", self.send_latency);

        println!("\n🛑 Shutdown");
        println!("   ├─ Final flush: {:?}", self.final_flush);
        println!("   └─ Rows left uncommitted: {}", self.rows_left);

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(rows_flushed: u64, duration: Duration) -> PipelineStats {
        PipelineStats {
            records_ingested: rows_flushed,
            decode_errors: 0,
            poll_errors: 0,
            flush: FlushSnapshot {
                rows_flushed,
                ..Default::default()
            },
            send_latency: StatsSummary::default(),
            final_flush: FlushOutcome::Empty,
            rows_left: 0,
            duration,
        }
    }

    #[test]
    fn test_throughput() {
        assert_eq!(stats(500, Duration::from_secs(10)).throughput(), 50.0);
        assert_eq!(stats(500, Duration::ZERO).throughput(), 0.0);
    }
}
