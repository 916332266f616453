//! Sink implementations
//!
//! Contains ClickHouseSink and LogSink, plus the config-driven factory.

mod clickhouse;
mod log;

pub use self::clickhouse::ClickHouseSink;
pub use self::log::LogSink;

use contracts::{BulkSink, RenderedRow, SendError, SinkConfig, SinkKind};
use tracing::{info, instrument};

use crate::error::DispatcherError;

/// Sink selected by configuration
pub enum ConfiguredSink {
    ClickHouse(ClickHouseSink),
    Log(LogSink),
}

impl BulkSink for ConfiguredSink {
    fn name(&self) -> &str {
        match self {
            Self::ClickHouse(sink) => sink.name(),
            Self::Log(sink) => sink.name(),
        }
    }

    async fn send(&mut self, rows: &[RenderedRow]) -> Result<(), SendError> {
        match self {
            Self::ClickHouse(sink) => sink.send(rows).await,
            Self::Log(sink) => sink.send(rows).await,
        }
    }
}

/// Create the sink described by `config`
///
/// # Errors
/// HTTP client construction failure; fatal at startup.
#[instrument(name = "dispatcher_create_sink", skip(config), fields(kind = %config.kind))]
pub fn create_sink(config: &SinkConfig) -> Result<ConfiguredSink, DispatcherError> {
    let sink = match config.kind {
        SinkKind::ClickHouse => ClickHouseSink::new("clickhouse", config)
            .map(ConfiguredSink::ClickHouse)
            .map_err(|e| DispatcherError::sink_creation("clickhouse", e.to_string()))?,
        SinkKind::Log => ConfiguredSink::Log(LogSink::new("log")),
    };

    info!(sink = %sink.name(), "Sink created");
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sink_by_kind() {
        let log = create_sink(&SinkConfig {
            kind: SinkKind::Log,
            ..SinkConfig::default()
        })
        .unwrap();
        assert!(matches!(log, ConfiguredSink::Log(_)));
        assert_eq!(log.name(), "log");

        let http = create_sink(&SinkConfig::default()).unwrap();
        assert_eq!(http.name(), "clickhouse");
    }
}
