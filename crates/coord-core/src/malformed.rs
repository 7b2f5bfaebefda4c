//! Malformed value reporting
//!
//! A source that answers with the wrong name, or with coordinates the caller
//! did not ask for, has broken its contract. Such values never take part in
//! selection; they are collected per request and handed to a
//! [`MalformedHandler`] as one batch.

use crate::coordinates::Coordinates;
use crate::value::Value;
use std::fmt;

/// Why a value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalformedReason {
    /// The value's name differs from the requested name
    NameMismatch,
    /// The value has more dimensions than the request
    ExcessCoordinates,
    /// Same number of dimensions as the request but not the same map
    SiblingCoordinates,
    /// Fewer dimensions than the request but not drawn from it
    NotSubset,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NameMismatch => "name does not match the request",
            Self::ExcessCoordinates => "more coordinates than requested",
            Self::SiblingCoordinates => "coordinates differ from the request",
            Self::NotSubset => "coordinates are not a subset of the request",
        };
        f.write_str(text)
    }
}

/// A rejected value together with the reason it was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedValue {
    pub value: Value,
    pub reason: MalformedReason,
}

/// Receives the malformed values of a request.
///
/// Called at most once per request, only when the batch is non-empty. The
/// handler cannot influence which value is selected.
pub trait MalformedHandler: Send + Sync {
    fn handle(&self, coordinates: &Coordinates, name: &str, values: &[MalformedValue]);
}

/// Handler that drops malformed values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardMalformed;

impl MalformedHandler for DiscardMalformed {
    fn handle(&self, _coordinates: &Coordinates, _name: &str, _values: &[MalformedValue]) {}
}

impl<F> MalformedHandler for F
where
    F: Fn(&Coordinates, &str, &[MalformedValue]) + Send + Sync,
{
    fn handle(&self, coordinates: &Coordinates, name: &str, values: &[MalformedValue]) {
        self(coordinates, name, values)
    }
}
