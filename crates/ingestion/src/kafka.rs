//! Kafka log source
//!
//! `StreamConsumer` with auto-commit disabled: the group offset only moves
//! when the coordinator calls [`LogSource::commit_current`] after a batch
//! was accepted downstream.

use std::time::Duration;

use contracts::{CommitError, LogSource, PollOutcome, SourceConfig, SourcePosition, SourceRecord};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::{ClientConfig, Message};
use tracing::{debug, info, instrument, warn};

use crate::codec;
use crate::error::{IngestionError, Result};

/// Kafka-backed [`LogSource`]
pub struct KafkaSource {
    name: String,
    consumer: StreamConsumer,
}

impl KafkaSource {
    /// Create the consumer and subscribe to the configured topic
    ///
    /// # Errors
    /// Client creation or subscription failure; both are fatal at startup.
    #[instrument(name = "kafka_source_connect", skip(config), fields(topic = %config.topic))]
    pub fn connect(config: &SourceConfig) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", &config.auto_offset_reset)
            .create()
            .map_err(|e| IngestionError::KafkaSetup {
                topic: config.topic.clone(),
                message: format!("failed to create consumer: {e}"),
            })?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| IngestionError::KafkaSetup {
                topic: config.topic.clone(),
                message: format!("failed to subscribe: {e}"),
            })?;

        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            topic = %config.topic,
            "Kafka source subscribed"
        );

        Ok(Self {
            name: format!("kafka:{}", config.topic),
            consumer,
        })
    }
}

impl LogSource for KafkaSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, timeout: Duration) -> PollOutcome {
        let message = match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_) => return PollOutcome::Empty,
            Ok(Err(KafkaError::MessageConsumption(RDKafkaErrorCode::TimedOut))) => {
                return PollOutcome::Empty;
            }
            Ok(Err(e)) => return PollOutcome::Transport(e.to_string()),
            Ok(Ok(message)) => message,
        };

        let position = SourcePosition::new(message.partition(), message.offset());
        let Some(payload) = message.payload() else {
            return PollOutcome::Malformed {
                position: Some(position),
                reason: "message has no payload".into(),
            };
        };

        match codec::decode(payload) {
            Ok(record) => PollOutcome::Record(SourceRecord { record, position }),
            Err(e) => PollOutcome::Malformed {
                position: Some(position),
                reason: e.to_string(),
            },
        }
    }

    async fn commit_current(&mut self) -> std::result::Result<(), CommitError> {
        // blocking librdkafka call; requires the multi-thread runtime
        let result = tokio::task::block_in_place(|| {
            self.consumer.commit_consumer_state(CommitMode::Sync)
        });

        match result {
            Ok(()) => {
                debug!(source = %self.name, "offsets committed");
                Ok(())
            }
            // nothing consumed since the last commit
            Err(KafkaError::ConsumerCommit(RDKafkaErrorCode::NoOffset)) => Ok(()),
            Err(e) => {
                warn!(source = %self.name, error = %e, "offset commit failed");
                Err(CommitError::new(e.to_string()))
            }
        }
    }
}
