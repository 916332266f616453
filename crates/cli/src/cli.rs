//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use config_loader::ConfigOverrides;
use contracts::SinkKind;
use std::path::PathBuf;

/// HTTP Log Anonymizer - Kafka to ClickHouse forwarder with IP anonymization
#[derive(Parser, Debug)]
#[command(
    name = "http-log-anonymizer",
    author,
    version,
    about = "Anonymize HTTP access logs from Kafka and bulk-insert them into ClickHouse",
    long_about = "Consumes Cap'n Proto encoded HTTP log records from Kafka, masks the last \n\
                  octet of the client address, batches the rows and inserts them over \n\
                  HTTP. Offsets are committed only after a batch is accepted."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ANONYMIZER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "ANONYMIZER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus exporter port for `run` (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "ANONYMIZER_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Subcommand; `run` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn metrics_port(&self) -> Option<u16> {
        (self.metrics_port != 0).then_some(self.metrics_port)
    }

    /// The selected command, `run` with default arguments when none was given
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Run(RunArgs::default()))
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the forwarder (default)
    Run(RunArgs),

    /// Validate the effective configuration without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Configuration file plus per-key overrides, shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Optional configuration file (TOML or JSON) used as the base
    #[arg(short, long, global = true, env = "ANONYMIZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kafka bootstrap servers
    #[arg(long, global = true, env = "KAFKA_BROKERS")]
    pub brokers: Option<String>,

    /// Kafka consumer group
    #[arg(long, global = true, env = "KAFKA_GROUP_ID")]
    pub group_id: Option<String>,

    /// Kafka topic
    #[arg(long, global = true, env = "KAFKA_TOPIC")]
    pub topic: Option<String>,

    /// Start position when the group has no committed offset
    #[arg(long, global = true, env = "KAFKA_AUTO_OFFSET_RESET")]
    pub auto_offset_reset: Option<String>,

    /// Bulk-insert URL, query string included
    #[arg(long, global = true, env = "CLICKHOUSE_URL")]
    pub clickhouse_url: Option<String>,

    /// Sink implementation (clickhouse | log)
    #[arg(long, global = true, env = "ANONYMIZER_SINK")]
    pub sink: Option<SinkKind>,

    /// Rows that make a batch due
    #[arg(long, global = true, env = "BATCH_MAX")]
    pub batch_max: Option<usize>,

    /// Batch age trigger and minimum spacing between sends, in seconds
    #[arg(long, global = true, env = "FLUSH_SECONDS")]
    pub flush_seconds: Option<u64>,

    /// Delay before retrying a failed (non-overload) send, in seconds
    #[arg(long, global = true, env = "RETRY_DELAY_SECONDS")]
    pub retry_delay_seconds: Option<u64>,

    /// Longest single poll wait, in milliseconds
    #[arg(long, global = true, env = "POLL_TIMEOUT_MS")]
    pub poll_timeout_ms: Option<u64>,

    /// Sink connect timeout, in milliseconds
    #[arg(long, global = true, env = "SINK_CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Sink request timeout, in milliseconds
    #[arg(long, global = true, env = "SINK_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,
}

impl ConfigArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            brokers: self.brokers.clone(),
            group_id: self.group_id.clone(),
            topic: self.topic.clone(),
            auto_offset_reset: self.auto_offset_reset.clone(),
            poll_timeout_ms: self.poll_timeout_ms,
            sink: self.sink,
            clickhouse_url: self.clickhouse_url.clone(),
            connect_timeout_ms: self.connect_timeout_ms,
            request_timeout_ms: self.request_timeout_ms,
            batch_max: self.batch_max,
            flush_seconds: self.flush_seconds,
            retry_delay_seconds: self.retry_delay_seconds,
        }
    }
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Validate configuration and exit without connecting
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
