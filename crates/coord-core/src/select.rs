//! Candidate bucketing and the specificity rule
//!
//! [`Candidates`] sorts each answer of a request into exact matches, subset
//! matches or malformed values. [`Candidates::decide`] then applies the
//! selection rule:
//!
//! 1. A single exact match wins outright.
//! 2. Otherwise every valid value (including duplicate exact matches) is
//!    grouped by specificity and only the most specific band is considered.
//! 3. A band of one wins. In a larger band, a single authoritative value
//!    wins.
//! 4. Anything else is a tie for the arbiters.

use crate::coordinates::Coordinates;
use crate::malformed::{MalformedReason, MalformedValue};
use crate::value::Value;

/// Outcome of the specificity rule for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No source had a valid opinion
    Empty,
    /// A single value was selected
    Winner(Value),
    /// Equally specific values that the rule could not separate, in
    /// discovery order
    Tied(Vec<Value>),
}

/// Request-scoped buckets of source answers.
#[derive(Debug)]
pub struct Candidates<'r> {
    coordinates: &'r Coordinates,
    name: &'r str,
    exact: Vec<Value>,
    subset: Vec<Value>,
    malformed: Vec<MalformedValue>,
}

impl<'r> Candidates<'r> {
    /// Start collecting answers for a request.
    pub fn new(coordinates: &'r Coordinates, name: &'r str) -> Self {
        Self {
            coordinates,
            name,
            exact: Vec::new(),
            subset: Vec::new(),
            malformed: Vec::new(),
        }
    }

    /// Classify one source answer.
    pub fn offer(&mut self, value: Value) {
        match self.classify(&value) {
            Ok(true) => self.exact.push(value),
            Ok(false) => self.subset.push(value),
            Err(reason) => self.malformed.push(MalformedValue { value, reason }),
        }
    }

    /// `Ok(true)` for an exact match, `Ok(false)` for a proper subset.
    fn classify(&self, value: &Value) -> Result<bool, MalformedReason> {
        if value.name() != self.name {
            return Err(MalformedReason::NameMismatch);
        }
        let requested = self.coordinates;
        let offered = value.coordinates();
        if offered.len() > requested.len() {
            Err(MalformedReason::ExcessCoordinates)
        } else if offered == requested {
            Ok(true)
        } else if offered.len() == requested.len() {
            Err(MalformedReason::SiblingCoordinates)
        } else if offered.is_subset_of(requested) {
            Ok(false)
        } else {
            Err(MalformedReason::NotSubset)
        }
    }

    pub fn exact_matches(&self) -> &[Value] {
        &self.exact
    }

    pub fn subset_matches(&self) -> &[Value] {
        &self.subset
    }

    pub fn malformed(&self) -> &[MalformedValue] {
        &self.malformed
    }

    /// Take the malformed batch out, leaving it empty.
    pub fn take_malformed(&mut self) -> Vec<MalformedValue> {
        std::mem::take(&mut self.malformed)
    }

    /// Apply the specificity and authoritative rules.
    pub fn decide(self) -> Selection {
        let Self {
            mut exact, subset, ..
        } = self;

        if exact.len() == 1 {
            return exact.pop().map_or(Selection::Empty, Selection::Winner);
        }

        let mut pool = exact;
        pool.extend(subset);
        if pool.is_empty() {
            return Selection::Empty;
        }

        // Stable: equal specificity keeps discovery order.
        pool.sort_by(|a, b| b.specificity().cmp(&a.specificity()));
        let top = pool[0].specificity();
        let band_len = pool.iter().take_while(|v| v.specificity() == top).count();
        pool.truncate(band_len);

        if pool.len() == 1 {
            return pool.pop().map_or(Selection::Empty, Selection::Winner);
        }

        let mut authoritative = pool.iter().filter(|v| v.is_authoritative());
        if let (Some(only), None) = (authoritative.next(), authoritative.next()) {
            return Selection::Winner(only.clone());
        }

        Selection::Tied(pool)
    }
}
