//! AnonymizerConfig - config_loader output
//!
//! Describes the full pipeline configuration: log source, bulk sink and flush policy.
//! Every field has a default so an empty file (or no file at all) is a valid base.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::policy::{
    FlushPolicy, DEFAULT_BATCH_MAX, DEFAULT_FLUSH_SECONDS, DEFAULT_RETRY_DELAY_SECONDS,
};

/// Default broker list
pub const DEFAULT_BROKERS: &str = "localhost:9092,broker:29092";
/// Default consumer group
pub const DEFAULT_GROUP_ID: &str = "anonymizer";
/// Default topic
pub const DEFAULT_TOPIC: &str = "http_log";
/// Default bulk-insert endpoint
pub const DEFAULT_CLICKHOUSE_URL: &str = "http://localhost:8124/?query=INSERT%20INTO%20logs.http_log%20FORMAT%20JSONEachRow&input_format_defaults_for_omitted_fields=1";

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizerConfig {
    /// Configuration version
    pub version: ConfigVersion,

    /// Kafka consumer settings
    pub source: SourceConfig,

    /// Downstream bulk-insert settings
    pub sink: SinkConfig,

    /// Batch trigger and backoff settings
    pub flush: FlushConfig,
}

/// Log source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Comma-separated bootstrap servers
    pub brokers: String,

    /// Consumer group identifier
    pub group_id: String,

    /// Subscribed topic
    pub topic: String,

    /// Where to start when the group has no committed offset
    pub auto_offset_reset: String,

    /// Upper bound of a single poll wait
    pub poll_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            brokers: DEFAULT_BROKERS.to_string(),
            group_id: DEFAULT_GROUP_ID.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            auto_offset_reset: "earliest".to_string(),
            poll_timeout_ms: 100,
        }
    }
}

impl SourceConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

/// Sink implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// HTTP bulk insert (JSONEachRow)
    #[default]
    #[serde(rename = "clickhouse")]
    ClickHouse,
    /// Log a batch summary and accept it
    Log,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClickHouse => "clickhouse",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clickhouse" => Ok(Self::ClickHouse),
            "log" => Ok(Self::Log),
            other => Err(format!(
                "unknown sink kind '{other}', expected 'clickhouse' or 'log'"
            )),
        }
    }
}

/// Bulk sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,

    /// Full insert URL including the query string
    pub url: String,

    pub connect_timeout_ms: u64,

    /// Total request timeout, body upload included
    pub request_timeout_ms: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            url: DEFAULT_CLICKHOUSE_URL.to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl SinkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Flush trigger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlushConfig {
    /// Row-count trigger
    pub batch_max: usize,

    /// Age trigger and minimum spacing between sends, in seconds
    pub flush_seconds: u64,

    /// Fixed delay after a non-overload send failure, in seconds
    pub retry_delay_seconds: u64,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            batch_max: DEFAULT_BATCH_MAX,
            flush_seconds: DEFAULT_FLUSH_SECONDS,
            retry_delay_seconds: DEFAULT_RETRY_DELAY_SECONDS,
        }
    }
}

impl FlushConfig {
    /// Build the immutable runtime policy
    pub fn policy(&self) -> FlushPolicy {
        FlushPolicy::new(self.batch_max, Duration::from_secs(self.flush_seconds))
            .with_retry_delay(Duration::from_secs(self.retry_delay_seconds))
    }
}
