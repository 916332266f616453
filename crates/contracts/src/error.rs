//! Layered error definitions
//!
//! Categorized by source: config / source / sink / commit

use thiserror::Error;

/// Unified startup and configuration error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Source Errors =====
    /// Log source could not be created or subscribed
    #[error("source '{source_name}' connection error: {message}")]
    SourceConnection {
        source_name: String,
        message: String,
    },

    // ===== Sink Errors =====
    /// Sink could not be created
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create source connection error
    pub fn source_connection(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceConnection {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create sink connection error
    pub fn sink_connection(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkConnection {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

/// Failure of a single bulk send attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Downstream is rate limiting or overloaded; wait for the next window
    #[error("downstream overloaded (HTTP {status}): {body}")]
    Overload { status: u16, body: String },

    /// Downstream answered with a non-success status that is not an overload
    #[error("downstream rejected batch (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Connection, timeout or response read failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Coarse classification of a [`SendError`], which picks the backoff path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailureKind {
    Overload,
    Other,
}

impl SendFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overload => "overload",
            Self::Other => "other",
        }
    }
}

impl SendError {
    pub fn kind(&self) -> SendFailureKind {
        match self {
            Self::Overload { .. } => SendFailureKind::Overload,
            Self::Rejected { .. } | Self::Transport(_) => SendFailureKind::Other,
        }
    }

    pub fn is_overload(&self) -> bool {
        self.kind() == SendFailureKind::Overload
    }
}

/// Offset commit failure; logged by the caller, never fatal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("offset commit failed: {message}")]
pub struct CommitError {
    pub message: String,
}

impl CommitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
