//! Decoded log records and their position in the source log.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rendered, single-line JSON form of one record.
pub type RenderedRow = String;

/// One decoded HTTP access log entry.
///
/// Immutable once decoded; the transformer consumes it to produce a
/// [`RenderedRow`] and the record is dropped afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpLogRecord {
    /// Request time, epoch milliseconds
    pub timestamp_epoch_milli: u64,
    pub resource_id: u64,
    pub bytes_sent: u64,
    /// Request duration in milliseconds
    pub request_time_milli: u64,
    pub response_status: u16,
    pub cache_status: String,
    pub method: String,
    /// Dotted IPv4 or an opaque string
    pub remote_addr: String,
    pub url: String,
}

/// Position of a record in the partitioned log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourcePosition {
    pub partition: i32,
    pub offset: i64,
}

impl SourcePosition {
    pub fn new(partition: i32, offset: i64) -> Self {
        Self { partition, offset }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.partition, self.offset)
    }
}

/// A decoded record together with where it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub record: HttpLogRecord,
    pub position: SourcePosition,
}

/// Result of a single bounded poll on a [`crate::LogSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A record was consumed and decoded
    Record(SourceRecord),

    /// The poll timeout elapsed without a message; not an error
    Empty,

    /// A message was consumed but could not be decoded; it is skipped
    Malformed {
        position: Option<SourcePosition>,
        reason: String,
    },

    /// The log client reported an error while polling
    Transport(String),
}

impl PollOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
