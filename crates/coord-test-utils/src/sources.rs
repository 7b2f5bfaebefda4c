//! Source fixtures

use coord_core::{Coordinates, Error, Lookup, Result, Source, SourceInfo, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A source with a fixed scope and a fixed table of answers.
///
/// It answers with its own coordinates no matter what the caller asked for,
/// which is exactly how a misbehaving or coarse-grained source looks to the
/// engine.
///
/// # Example
///
/// ```
/// use coord_test_utils::ScriptedSource;
///
/// let west = ScriptedSource::new("west")
///     .scoped("{region=west}")
///     .answer("db.url", "jdbc:west");
/// assert_eq!(west.calls(), 0);
/// ```
#[derive(Debug)]
pub struct ScriptedSource {
    info: SourceInfo,
    coordinates: Coordinates,
    answers: BTreeMap<String, Option<String>>,
    authoritative: bool,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(id: &str) -> Self {
        Self {
            info: SourceInfo::new(id),
            coordinates: Coordinates::new(),
            answers: BTreeMap::new(),
            authoritative: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Scope every answer to these coordinates (`{k=v, ...}` syntax).
    pub fn scoped(mut self, coordinates: &str) -> Self {
        self.coordinates = crate::coords(coordinates);
        self
    }

    pub fn ranked(mut self, rank: u32) -> Self {
        self.info = self.info.with_rank(rank);
        self
    }

    pub fn authoritative(mut self) -> Self {
        self.authoritative = true;
        self
    }

    pub fn answer(mut self, name: &str, raw: &str) -> Self {
        self.answers.insert(name.to_string(), Some(raw.to_string()));
        self
    }

    /// Answer `name` with an explicit "no value".
    pub fn answer_none(mut self, name: &str) -> Self {
        self.answers.insert(name.to_string(), None);
        self
    }

    /// Number of queries received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Source for ScriptedSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn query(&self, _lookup: &Lookup<'_>, _coordinates: &Coordinates, name: &str) -> Result<Option<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answers.get(name).map(|raw| {
            Value::new(&self.info, self.coordinates.clone(), name, raw.clone())
                .authoritative(self.authoritative)
        }))
    }

    fn names(&self) -> BTreeSet<String> {
        self.answers.keys().cloned().collect()
    }
}

/// A source that, to answer `name`, first resolves `needs` through the
/// engine, then answers with `"<prefix><resolved>"` at empty coordinates.
///
/// Pointing `needs` back at `name` builds a self-referential loop that the
/// engine must break.
#[derive(Debug)]
pub struct ReentrantSource {
    info: SourceInfo,
    name: String,
    needs: String,
    prefix: String,
    calls: AtomicUsize,
    seen: Mutex<Vec<Option<String>>>,
}

impl ReentrantSource {
    pub fn new(id: &str, name: &str, needs: &str, prefix: &str) -> Self {
        Self {
            info: SourceInfo::new(id),
            name: name.to_string(),
            needs: needs.to_string(),
            prefix: prefix.to_string(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// What each nested lookup returned, in order.
    pub fn seen(&self) -> Vec<Option<String>> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Source for ReentrantSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn query(&self, lookup: &Lookup<'_>, coordinates: &Coordinates, name: &str) -> Result<Option<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if name != self.name {
            return Ok(None);
        }
        let resolved = lookup.get_string(coordinates, &self.needs)?;
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(resolved.clone());
        }
        Ok(resolved.map(|inner| {
            Value::new(
                &self.info,
                Coordinates::new(),
                name,
                Some(format!("{}{}", self.prefix, inner)),
            )
        }))
    }
}

/// A source that fails every query.
#[derive(Debug)]
pub struct FailingSource {
    info: SourceInfo,
}

impl FailingSource {
    pub fn new(id: &str) -> Self {
        Self {
            info: SourceInfo::new(id),
        }
    }
}

impl Source for FailingSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn query(&self, _lookup: &Lookup<'_>, _coordinates: &Coordinates, _name: &str) -> Result<Option<Value>> {
        Err(Error::source_failed(self.info.id(), "backing store unavailable"))
    }
}
