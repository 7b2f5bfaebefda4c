//! Error types for coord-core

use crate::coordinates::Coordinates;
use crate::value::Value;

/// Result type for coord-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a configuration value
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No converter is registered for the requested type
    #[error("No converter registered for type {type_name}")]
    NoConverter { type_name: &'static str },

    /// Several values tied and no arbiter could pick one
    #[error("Ambiguous values for {name} at {coordinates}: {}", render_values(.values))]
    Ambiguous {
        coordinates: Coordinates,
        name: String,
        values: Vec<Value>,
    },

    /// More than one source matched the request exactly and the engine is
    /// configured to reject rather than arbitrate
    #[error("Duplicate exact matches for {name} at {coordinates}: {}", render_values(.values))]
    DuplicateExactMatch {
        coordinates: Coordinates,
        name: String,
        values: Vec<Value>,
    },

    /// A converter could not parse its input
    #[error("Cannot convert {input:?} to {type_name}: {message}")]
    Conversion {
        type_name: &'static str,
        input: String,
        message: String,
    },

    /// The requested property name is not usable
    #[error("Invalid property name: {name:?}")]
    InvalidName { name: String },

    /// A source failed while answering a query
    #[error("Source {source_id} failed: {message}")]
    Source { source_id: String, message: String },

    /// Engine configuration could not be decoded
    #[error("Invalid engine configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a conversion error for type `T`.
    pub fn conversion<T: ?Sized>(input: impl Into<String>, message: impl ToString) -> Self {
        Self::Conversion {
            type_name: std::any::type_name::<T>(),
            input: input.into(),
            message: message.to_string(),
        }
    }

    /// Create a source failure error.
    pub fn source_failed(source_id: impl Into<String>, message: impl ToString) -> Self {
        Self::Source {
            source_id: source_id.into(),
            message: message.to_string(),
        }
    }
}

fn render_values(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
