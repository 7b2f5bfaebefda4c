//! Configuration values and source identity

use crate::coordinates::Coordinates;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a [`Source`](crate::Source).
///
/// Cheap to clone; every [`Value`] carries the info of the source that
/// produced it so arbiters can rank it and errors can name it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceInfo {
    id: Arc<str>,
    rank: Option<u32>,
}

impl SourceInfo {
    /// Create an unranked source identity.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self {
            id: Arc::from(id.as_ref()),
            rank: None,
        }
    }

    /// Attach a rank. Lower ranks are preferred by
    /// [`RankedArbiter::by_source_rank`](crate::RankedArbiter::by_source_rank).
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rank(&self) -> Option<u32> {
        self.rank
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A named, coordinate-scoped answer from one source.
///
/// `raw` may be `None`: the source has an opinion, and its opinion is "no
/// value". That is distinct from the source returning no `Value` at all.
///
/// Equality and hashing consider coordinates, name and payload only; the
/// producing source and the authoritative flag are ignored.
#[derive(Debug, Clone)]
pub struct Value {
    source: SourceInfo,
    coordinates: Coordinates,
    name: String,
    raw: Option<String>,
    authoritative: bool,
}

impl Value {
    /// Create a non-authoritative value.
    pub fn new(
        source: &SourceInfo,
        coordinates: Coordinates,
        name: impl Into<String>,
        raw: Option<String>,
    ) -> Self {
        Self {
            source: source.clone(),
            coordinates,
            name: name.into(),
            raw,
            authoritative: false,
        }
    }

    /// Mark whether the source declares itself ground truth for this name.
    pub fn authoritative(mut self, authoritative: bool) -> Self {
        self.authoritative = authoritative;
        self
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    /// Number of dimensions this value is scoped to.
    pub fn specificity(&self) -> usize {
        self.coordinates.len()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.coordinates == other.coordinates && self.name == other.name && self.raw == other.raw
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinates.hash(state);
        self.name.hash(state);
        self.raw.hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) ", self.source)?;
        if !self.coordinates.is_empty() {
            write!(f, "{} ", self.coordinates)?;
        }
        write!(f, "{}=", self.name)?;
        match &self.raw {
            Some(raw) => f.write_str(raw)?,
            None => f.write_str("<none>")?,
        }
        if self.authoritative {
            f.write_str(" (authoritative)")?;
        }
        Ok(())
    }
}
