//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::AnonymizerConfig;

use crate::cli::ConfigArgs;
use crate::error::ensure_config_exists;

/// Defaults, optional file, then env / flag overrides; validated
fn load_config(args: &ConfigArgs) -> Result<AnonymizerConfig> {
    let path = args.config.as_deref();
    ensure_config_exists(path)?;

    config_loader::ConfigLoader::load(path, &args.overrides()).with_context(|| match path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Invalid configuration".to_string(),
    })
}
