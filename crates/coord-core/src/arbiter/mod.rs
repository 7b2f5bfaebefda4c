//! Arbitration of tied values
//!
//! When the specificity rule leaves several equally specific values, the
//! engine asks its arbiters, in registration order, to pick one. The first
//! arbiter to return a value wins; if all decline the request fails as
//! ambiguous.

mod ranked;

pub use ranked::{RankedArbiter, RankedOrder};

use crate::coordinates::Coordinates;
use crate::value::Value;

/// Resolves a set of tied values to one, or declines.
pub trait Arbiter: Send + Sync {
    /// Pick one of `tied`, or return `None` to let the next arbiter try.
    fn arbitrate(&self, coordinates: &Coordinates, name: &str, tied: &[Value]) -> Option<Value>;
}

impl<F> Arbiter for F
where
    F: Fn(&Coordinates, &str, &[Value]) -> Option<Value> + Send + Sync,
{
    fn arbitrate(&self, coordinates: &Coordinates, name: &str, tied: &[Value]) -> Option<Value> {
        self(coordinates, name, tied)
    }
}
