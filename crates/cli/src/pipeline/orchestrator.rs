//! Pipeline orchestrator - builds source and sink, then drives the run loop.
//!
//! Supports both Kafka and mock modes via feature flags.
//! When the `kafka` feature is disabled, runs against an empty mock source.

use contracts::{AnonymizerConfig, BulkSink, LogSource};
use dispatcher::{create_sink, ConfiguredSink, FlushCoordinator, RunLoop};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::PipelineStats;
use crate::error::CliError;

/// Main pipeline orchestrator
pub struct Pipeline {
    config: AnonymizerConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: AnonymizerConfig) -> Self {
        Self { config }
    }

    /// Run until `cancel` fires
    ///
    /// # Errors
    /// Only startup failures; once running, failures are retried in place.
    pub async fn run(self, cancel: CancellationToken) -> Result<PipelineStats, CliError> {
        let sink = create_sink(&self.config.sink)
            .map_err(|e| CliError::sink_setup(self.config.sink.kind.as_str(), e))?;

        #[cfg(feature = "kafka")]
        return self.run_kafka(sink, cancel).await;

        #[cfg(not(feature = "kafka"))]
        return self.run_mock(sink, cancel).await;
    }

    /// Run against the configured Kafka cluster
    #[cfg(feature = "kafka")]
    async fn run_kafka(
        self,
        sink: ConfiguredSink,
        cancel: CancellationToken,
    ) -> Result<PipelineStats, CliError> {
        info!(
            brokers = %self.config.source.brokers,
            topic = %self.config.source.topic,
            "Connecting to Kafka..."
        );
        let source = ingestion::KafkaSource::connect(&self.config.source)
            .map_err(|e| CliError::source_setup(self.config.source.topic.as_str(), e))?;

        Ok(self.drive(source, sink, cancel).await)
    }

    /// Run against an empty mock source (no broker required)
    #[cfg(not(feature = "kafka"))]
    async fn run_mock(
        self,
        sink: ConfiguredSink,
        cancel: CancellationToken,
    ) -> Result<PipelineStats, CliError> {
        info!("Running in MOCK mode (no Kafka broker required)");
        let source = ingestion::MockLogSource::new("mock");
        Ok(self.drive(source, sink, cancel).await)
    }

    /// Common logic shared between Kafka and mock modes
    async fn drive<L: LogSource>(
        &self,
        source: L,
        sink: ConfiguredSink,
        cancel: CancellationToken,
    ) -> PipelineStats {
        let policy = self.config.flush.policy();
        info!(
            source = %source.name(),
            sink = %sink.name(),
            max_batch_size = policy.max_batch_size,
            flush_interval_secs = policy.min_flush_interval.as_secs(),
            retry_delay_secs = policy.retry_delay.as_secs(),
            "Pipeline configured"
        );

        let summary = RunLoop::new(
            source,
            FlushCoordinator::new(sink, policy),
            self.config.source.poll_timeout(),
        )
        .run(cancel)
        .await;

        PipelineStats::from(summary)
    }
}
