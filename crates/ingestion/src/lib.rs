//! # Ingestion
//!
//! Input side of the anonymizer.
//!
//! Responsibilities:
//! - Decode Cap'n Proto `HttpLogRecord` messages (`codec`)
//! - Transform records into anonymized JSON rows (`transform`)
//! - Poll and commit a partitioned log: Kafka (`KafkaSource`) or a scripted
//!   in-memory source (`MockLogSource`)
//! - Count ingested, malformed and failed polls (`IngestionMetrics`)
//!
//! ## Usage
//!
//! ```ignore
//! use contracts::{LogSource, PollOutcome};
//! use ingestion::{render_row, KafkaSource};
//!
//! let mut source = KafkaSource::connect(&config.source)?;
//! if let PollOutcome::Record(r) = source.poll(Duration::from_millis(100)).await {
//!     let row = render_row(&r.record)?;
//! }
//! ```

pub mod codec;
mod error;
#[allow(dead_code, clippy::all)]
mod http_log_capnp {
    include!(concat!(env!("OUT_DIR"), "/http_log_capnp.rs"));
}
#[cfg(feature = "kafka")]
mod kafka;
mod metrics;
mod mock;
mod transform;

// Re-exports
pub use codec::{decode, encode};
pub use error::{DecodeError, IngestionError, Result};
#[cfg(feature = "kafka")]
pub use kafka::KafkaSource;
pub use metrics::{IngestionMetrics, IngestionSnapshot};
pub use mock::MockLogSource;
pub use transform::{anonymize_ip, escape_json, join_rows, render_row};
