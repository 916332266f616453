//! LogSink - logs a batch summary and accepts it

use contracts::{BulkSink, RenderedRow, SendError};
use tracing::{debug, info, instrument};

/// Sink that accepts every batch, for dry runs without a downstream
pub struct LogSink {
    name: String,
    batches: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: 0,
        }
    }

    /// Batches accepted so far
    pub fn batches(&self) -> u64 {
        self.batches
    }
}

impl BulkSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_send",
        skip(self, rows),
        fields(sink = %self.name, rows = rows.len())
    )]
    async fn send(&mut self, rows: &[RenderedRow]) -> Result<(), SendError> {
        self.batches += 1;
        let bytes: usize = rows.iter().map(|r| r.len() + 1).sum();
        info!(
            sink = %self.name,
            batch = self.batches,
            rows = rows.len(),
            bytes,
            "Batch accepted"
        );
        if let Some(first) = rows.first() {
            debug!(sink = %self.name, first_row = %first, "Batch sample");
        }
        Ok(())
    }
}
