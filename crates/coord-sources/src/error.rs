//! Error types for coord-sources

use std::path::PathBuf;

/// Result type for coord-sources operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a source
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A layer file could not be read
    #[error("Cannot read layer {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A layer file is not valid TOML or has the wrong shape
    #[error("Invalid layer {origin}: {message}")]
    InvalidLayer { origin: String, message: String },

    /// Error from the resolution engine
    #[error(transparent)]
    Core(#[from] coord_core::Error),
}

impl Error {
    pub(crate) fn invalid_layer(origin: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidLayer {
            origin: origin.into(),
            message: message.to_string(),
        }
    }
}
