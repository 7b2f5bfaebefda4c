//! Source for the engine's own coordinates

use crate::error::Result;
use coord_core::{CONFIGURATION_COORDINATES, Coordinates, Lookup, Source, SourceInfo, Value};
use std::collections::BTreeSet;

/// Environment variable read by [`CoordinatesSource::from_env`].
pub const COORDINATES_ENV_VAR: &str = "CONFIGURATION_COORDINATES";

#[derive(Debug, Clone)]
enum Origin {
    Env(String),
    Fixed(String),
}

/// Answers `configurationCoordinates`, and nothing else, with an
/// authoritative unscoped value.
///
/// The engine asks for that property while it is being built to learn its
/// own coordinates.
#[derive(Debug, Clone)]
pub struct CoordinatesSource {
    info: SourceInfo,
    origin: Origin,
}

impl CoordinatesSource {
    /// Read [`COORDINATES_ENV_VAR`] on every query.
    pub fn from_env() -> Self {
        Self::from_var(COORDINATES_ENV_VAR)
    }

    /// Read the named environment variable on every query.
    pub fn from_var(var: &str) -> Self {
        Self {
            info: SourceInfo::new("coordinates").with_rank(0),
            origin: Origin::Env(var.to_string()),
        }
    }

    /// Always answer with `coordinates` (in `{k=v, ...}` syntax).
    pub fn fixed(coordinates: impl Into<String>) -> Self {
        Self {
            info: SourceInfo::new("coordinates").with_rank(0),
            origin: Origin::Fixed(coordinates.into()),
        }
    }

    /// The coordinates this source would currently answer with, parsed.
    ///
    /// Lets a caller reject a malformed setting before building an engine.
    pub fn current(&self) -> Result<Option<Coordinates>> {
        let Some(raw) = self.raw() else {
            return Ok(None);
        };
        let coordinates = raw
            .parse()
            .map_err(|e| coord_core::Error::conversion::<Coordinates>(raw.as_str(), e))?;
        Ok(Some(coordinates))
    }

    fn raw(&self) -> Option<String> {
        match &self.origin {
            Origin::Env(var) => std::env::var(var).ok(),
            Origin::Fixed(raw) => Some(raw.clone()),
        }
    }
}

impl Source for CoordinatesSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn query(
        &self,
        _lookup: &Lookup<'_>,
        _coordinates: &Coordinates,
        name: &str,
    ) -> coord_core::Result<Option<Value>> {
        if name != CONFIGURATION_COORDINATES {
            return Ok(None);
        }
        Ok(self.raw().map(|raw| {
            Value::new(&self.info, Coordinates::new(), name, Some(raw)).authoritative(true)
        }))
    }

    fn names(&self) -> BTreeSet<String> {
        BTreeSet::from([CONFIGURATION_COORDINATES.to_string()])
    }
}
