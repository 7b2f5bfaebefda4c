//! Error types for coord-cli

use std::path::PathBuf;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from the resolution engine
    #[error(transparent)]
    Core(#[from] coord_core::Error),

    /// Error loading a source
    #[error(transparent)]
    Sources(#[from] coord_sources::Error),

    /// The --config file could not be used
    #[error("Invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// JSON output error
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
