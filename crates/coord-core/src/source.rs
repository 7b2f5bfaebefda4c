//! The Source contract and the request context passed to it

use crate::coordinates::Coordinates;
use crate::engine::Engine;
use crate::error::Result;
use crate::value::{SourceInfo, Value};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};

/// A provider of configuration values.
///
/// Given the caller's coordinates and a property name, a source either has
/// no opinion (`Ok(None)`) or answers with a single [`Value`]. The value must
/// carry the requested name and coordinates drawn from the request; anything
/// else is reported as malformed and ignored.
///
/// Sources are shared across threads and may be queried concurrently. A
/// source that needs configuration for itself can issue nested requests
/// through the [`Lookup`] it is given; while it is being queried the engine
/// will not query it again for those nested requests.
pub trait Source: Send + Sync {
    /// Identity of this source, attached to every value it produces.
    fn info(&self) -> &SourceInfo;

    /// Answer a request.
    fn query(&self, lookup: &Lookup<'_>, coordinates: &Coordinates, name: &str) -> Result<Option<Value>>;

    /// Names this source can answer for. Best effort, non-binding.
    fn names(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

/// Context of one top-level request.
///
/// Tracks which sources are currently being queried along this call chain so
/// a source that re-enters the engine is skipped rather than queried again.
/// Nested requests made through [`Lookup::get`] share the same set.
///
/// While a selected value is interpolated, its source is likewise skipped
/// for nested requests of the same name, so a value referring to itself
/// falls through to the remaining sources.
pub struct Lookup<'e> {
    engine: &'e Engine,
    active: RefCell<HashSet<usize>>,
    expanding: RefCell<HashSet<(usize, String)>>,
}

impl<'e> Lookup<'e> {
    pub(crate) fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            active: RefCell::new(HashSet::new()),
            expanding: RefCell::new(HashSet::new()),
        }
    }

    /// The engine serving this request.
    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    /// Resolve another property as part of the current request.
    pub fn get<T: 'static>(&self, coordinates: &Coordinates, name: &str) -> Result<Option<T>> {
        self.engine.get_in(self, coordinates, name, None)
    }

    /// Resolve another property as a string as part of the current request.
    pub fn get_string(&self, coordinates: &Coordinates, name: &str) -> Result<Option<String>> {
        self.get::<String>(coordinates, name)
    }

    /// Mark the source in `slot` active until the returned guard drops.
    ///
    /// Returns `None` if it is already active on this call chain.
    pub(crate) fn activate(&self, slot: usize) -> Option<Activation<'_>> {
        if self.active.borrow_mut().insert(slot) {
            Some(Activation {
                active: &self.active,
                slot,
            })
        } else {
            None
        }
    }

    pub(crate) fn is_active(&self, slot: usize) -> bool {
        self.active.borrow().contains(&slot)
    }

    /// Mark the value `slot` produced for `name` as being interpolated until
    /// the returned guard drops.
    pub(crate) fn expand(&self, slot: usize, name: &str) -> Option<Expansion<'_>> {
        let key = (slot, name.to_string());
        if self.expanding.borrow_mut().insert(key.clone()) {
            Some(Expansion {
                expanding: &self.expanding,
                key,
            })
        } else {
            None
        }
    }

    pub(crate) fn is_expanding(&self, slot: usize, name: &str) -> bool {
        self.expanding
            .borrow()
            .iter()
            .any(|(active, expanding)| *active == slot && expanding == name)
    }

    /// Whether this request runs inside another source's query or inside an
    /// interpolation, where some sources are being skipped.
    ///
    /// A source sees itself active while it is queried, so a top-level
    /// request reports `false`.
    pub fn is_nested(&self) -> bool {
        self.active.borrow().len() > 1 || !self.expanding.borrow().is_empty()
    }
}

/// Scope guard releasing a source activation on every exit path.
pub(crate) struct Activation<'l> {
    active: &'l RefCell<HashSet<usize>>,
    slot: usize,
}

impl Drop for Activation<'_> {
    fn drop(&mut self) {
        self.active.borrow_mut().remove(&self.slot);
    }
}

/// Scope guard releasing an interpolation mark.
pub(crate) struct Expansion<'l> {
    expanding: &'l RefCell<HashSet<(usize, String)>>,
    key: (usize, String),
}

impl Drop for Expansion<'_> {
    fn drop(&mut self) {
        self.expanding.borrow_mut().remove(&self.key);
    }
}
