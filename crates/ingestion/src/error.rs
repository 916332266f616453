//! Ingestion error types

use thiserror::Error;

/// Cap'n Proto decode failure for a single message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Payload is empty
    #[error("empty payload")]
    Empty,

    /// Segment table, pointer or text rejected by the message reader
    #[error("malformed message: {0}")]
    Malformed(String),
}

impl From<capnp::Error> for DecodeError {
    fn from(e: capnp::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Record could not be rendered as a row
    #[error("failed to render record: {message}")]
    Render {
        /// Error message
        message: String,
    },

    /// Kafka client construction or subscription failed
    #[error("kafka source '{topic}' setup failed: {message}")]
    KafkaSetup {
        /// Subscribed topic
        topic: String,
        /// Error message
        message: String,
    },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
