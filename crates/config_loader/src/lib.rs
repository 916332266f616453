//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Layer environment / CLI overrides on top
//! - Validate the result and hand out an `AnonymizerConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::{ConfigLoader, ConfigOverrides};
//! use std::path::Path;
//!
//! let config =
//!     ConfigLoader::load(Some(Path::new("anonymizer.toml")), &ConfigOverrides::default()).unwrap();
//! println!("Topic: {}", config.source.topic);
//! ```

mod overrides;
mod parser;
mod validator;

pub use contracts::AnonymizerConfig;
pub use overrides::ConfigOverrides;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Build the effective configuration
    ///
    /// Defaults, then the optional file, then `overrides`; validated last.
    ///
    /// # Errors
    /// - File read / parse failure
    /// - Validation failure
    pub fn load(
        path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<AnonymizerConfig, ContractError> {
        let mut config = match path {
            Some(path) => Self::parse_file(path)?,
            None => AnonymizerConfig::default(),
        };
        overrides.apply(&mut config);
        validator::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<AnonymizerConfig, ContractError> {
        let config = Self::parse_file(path)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<AnonymizerConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Validate an already assembled configuration
    pub fn validate(config: &AnonymizerConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(config: &AnonymizerConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize configuration to JSON string
    pub fn to_json(config: &AnonymizerConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn parse_file(path: &Path) -> Result<AnonymizerConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        parser::parse(&content, format)
    }
}
