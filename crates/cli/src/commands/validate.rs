//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{AnonymizerConfig, SinkKind};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::{ConfigArgs, ValidateArgs};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    topic: String,
    group_id: String,
    sink: String,
    batch_max: usize,
    flush_seconds: u64,
}

/// Execute the `validate` command
pub fn run_validate(config_args: &ConfigArgs, args: &ValidateArgs) -> Result<()> {
    info!(config = ?config_args.config, "Validating configuration");

    let result = validate_config(config_args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ConfigArgs) -> ValidationResult {
    let config_path = args.config.as_ref().map(|p| p.display().to_string());

    match load_config(args) {
        Ok(config) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&config),
            summary: Some(ConfigSummary {
                topic: config.source.topic.clone(),
                group_id: config.source.group_id.clone(),
                sink: config.sink.kind.to_string(),
                batch_max: config.flush.batch_max,
                flush_seconds: config.flush.flush_seconds,
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("{e:#}")),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// Legal but probably unintended settings
fn collect_warnings(config: &AnonymizerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.sink.kind == SinkKind::Log {
        warnings.push("sink 'log' only logs batches; nothing is inserted".to_string());
    }
    if config.flush.flush_seconds < 5 {
        warnings.push(format!(
            "flush_seconds = {} sends small batches at a high rate",
            config.flush.flush_seconds
        ));
    }
    if config.sink.url.starts_with("http://")
        && !config.sink.url.contains("localhost")
        && config.sink.kind == SinkKind::ClickHouse
    {
        warnings.push("sink url uses plain http to a remote host".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    let source = result.config_path.as_deref().unwrap_or("<defaults + environment>");
    if result.valid {
        println!("✅ Configuration is valid: {}", source);
        if let Some(summary) = &result.summary {
            println!("   ├─ Topic: {} (group {})", summary.topic, summary.group_id);
            println!("   ├─ Sink: {}", summary.sink);
            println!(
                "   └─ Flush: {} rows / {}s",
                summary.batch_max, summary.flush_seconds
            );
        }
        for warning in &result.warnings {
            println!("⚠️  {}", warning);
        }
    } else {
        println!("❌ Configuration is invalid: {}", source);
        if let Some(error) = &result.error {
            println!("   └─ {}", error);
        }
    }
}
