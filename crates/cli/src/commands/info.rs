//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::AnonymizerConfig;
use tracing::info;

use super::load_config;
use crate::cli::{ConfigArgs, InfoArgs};

/// Execute the `info` command
pub fn run_info(config_args: &ConfigArgs, args: &InfoArgs) -> Result<()> {
    info!(config = ?config_args.config, "Loading configuration info");

    let config = load_config(config_args)?;

    if args.json {
        let json = config_loader::ConfigLoader::to_json(&config)
            .context("Failed to serialize configuration")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn print_config_info(config: &AnonymizerConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              HTTP Log Anonymizer Configuration               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let source = &config.source;
    println!("📥 Source (Kafka)");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ Brokers: {}", source.brokers);
    println!("   ├─ Group: {}", source.group_id);
    println!("   ├─ Topic: {}", source.topic);
    println!("   ├─ Offset reset: {}", source.auto_offset_reset);
    println!("   └─ Poll timeout: {} ms", source.poll_timeout_ms);

    let sink = &config.sink;
    println!("\n📤 Sink ({})", sink.kind);
    println!("   ├─ URL: {}", sink.url);
    println!("   ├─ Connect timeout: {} ms", sink.connect_timeout_ms);
    println!("   └─ Request timeout: {} ms", sink.request_timeout_ms);

    let flush = &config.flush;
    println!("\n⚙️  Flush Policy");
    println!("   ├─ Batch max: {} rows", flush.batch_max);
    println!("   ├─ Interval: {}s (age trigger and overload cooldown)", flush.flush_seconds);
    println!("   └─ Retry delay: {}s", flush.retry_delay_seconds);

    println!();
}
