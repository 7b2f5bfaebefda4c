//! Interpolation hook applied to the selected string before conversion

use crate::coordinates::Coordinates;
use crate::error::Result;
use crate::source::Lookup;

/// Rewrites a raw value before it is converted.
///
/// The [`Lookup`] lets an implementation resolve other properties as part of
/// the same request. While a value is interpolated, nested requests for its
/// name skip the source that produced it, so a value such as `x${a}` stored
/// under `a` sees the remaining sources instead of itself.
pub trait Interpolator: Send + Sync {
    fn interpolate(&self, lookup: &Lookup<'_>, coordinates: &Coordinates, raw: &str) -> Result<String>;
}

/// Interpolator that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl Interpolator for Verbatim {
    fn interpolate(&self, _lookup: &Lookup<'_>, _coordinates: &Coordinates, raw: &str) -> Result<String> {
        Ok(raw.to_string())
    }
}
