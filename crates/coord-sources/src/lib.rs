//! Built-in configuration sources.
//!
//! - [`PropertiesSource`]: a fixed table of properties at fixed coordinates,
//!   usually loaded from a TOML layer file
//! - [`EnvironmentSource`]: process environment variables, unscoped
//! - [`CoordinatesSource`]: answers the engine's own coordinates bootstrap
//! - [`CachingSource`]: memoizes any other source

pub mod caching;
pub mod coordinates;
pub mod environment;
pub mod error;
pub mod properties;

pub use caching::CachingSource;
pub use coordinates::{COORDINATES_ENV_VAR, CoordinatesSource};
pub use environment::EnvironmentSource;
pub use error::{Error, Result};
pub use properties::PropertiesSource;

use coord_core::Source;
use std::sync::Arc;

/// Sources backed by the running process: environment variables and the
/// coordinates bootstrap.
pub fn process_sources() -> Vec<Arc<dyn Source>> {
    vec![
        Arc::new(EnvironmentSource::new()),
        Arc::new(CoordinatesSource::from_env()),
    ]
}
