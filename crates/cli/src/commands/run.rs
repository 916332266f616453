//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::AnonymizerConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::load_config;
use crate::cli::{ConfigArgs, RunArgs};
use crate::pipeline::Pipeline;

/// Execute the `run` command
pub async fn run_pipeline(config_args: &ConfigArgs, args: &RunArgs) -> Result<()> {
    let config = load_config(config_args)?;

    info!(
        brokers = %config.source.brokers,
        group_id = %config.source.group_id,
        topic = %config.source.topic,
        sink = %config.sink.kind,
        batch_max = config.flush.batch_max,
        flush_seconds = config.flush.flush_seconds,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone()).context("Failed to install signal handlers")?;

    info!("Starting forwarder...");
    let stats = Pipeline::new(config)
        .run(cancel)
        .await
        .context("Pipeline startup failed")?;

    info!(
        records = stats.records_ingested,
        rows_flushed = stats.flush.rows_flushed,
        duration_secs = stats.duration.as_secs_f64(),
        rows_per_sec = format!("{:.2}", stats.throughput()),
        "Forwarder stopped"
    );
    stats.print_summary();

    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM
fn spawn_shutdown_listener(token: CancellationToken) -> std::io::Result<()> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Ctrl+C handler unavailable");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            terminate.recv().await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        warn!("Received shutdown signal, finishing current step and flushing...");
        token.cancel();
    });

    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &AnonymizerConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Source:");
    println!("  Brokers: {}", config.source.brokers);
    println!("  Group: {}", config.source.group_id);
    println!("  Topic: {}", config.source.topic);
    println!("\nSink:");
    println!("  Kind: {}", config.sink.kind);
    println!("  URL: {}", config.sink.url);
    println!("\nFlush:");
    println!("  Batch max: {} rows", config.flush.batch_max);
    println!("  Interval: {}s", config.flush.flush_seconds);
    println!("  Retry delay: {}s", config.flush.retry_delay_seconds);
    println!();
}
