//! # HTTP Log Anonymizer CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证 (文件 + 环境变量 + 命令行)
//! - 转发循环的编排与生命周期管理
//! - 优雅关闭处理 (SIGINT / SIGTERM 后做最后一次 flush)

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command();

    // Exporter only makes sense for a long-running forwarder
    let metrics_port = match command {
        Commands::Run(_) => cli.metrics_port(),
        _ => None,
    };
    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port,
        default_log_level: ObservabilityConfig::level_for(cli.verbose, cli.quiet).to_string(),
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "HTTP log anonymizer starting"
    );

    let result = match &command {
        Commands::Run(args) => run_pipeline(&cli.config, args).await,
        Commands::Validate(args) => run_validate(&cli.config, args),
        Commands::Info(args) => run_info(&cli.config, args),
    };

    if let Err(ref e) = result {
        tracing::error!(fatal = true, error = %format!("{e:#}"), "Command failed");
    }

    result
}
