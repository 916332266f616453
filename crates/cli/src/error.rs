//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// Startup failures surfaced by the commands
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Log source could not be created
    #[error("Failed to create log source '{name}': {message}")]
    SourceSetup { name: String, message: String },

    /// Bulk sink could not be created
    #[error("Failed to create sink '{name}': {message}")]
    SinkSetup { name: String, message: String },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn source_setup(name: impl Into<String>, message: impl ToString) -> Self {
        Self::SourceSetup {
            name: name.into(),
            message: message.to_string(),
        }
    }

    pub fn sink_setup(name: impl Into<String>, message: impl ToString) -> Self {
        Self::SinkSetup {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Fail early with a readable message when an explicit config path is missing
pub fn ensure_config_exists(path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) if !path.exists() => Err(CliError::config_not_found(path)),
        _ => Ok(()),
    }
}
