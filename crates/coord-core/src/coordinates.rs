//! Configuration coordinates
//!
//! Coordinates locate a request or a value in configuration space: a set of
//! named dimensions (`region`, `environment`, `phase`, ...) and the value of
//! each. Empty coordinates mean "applies everywhere".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;

/// A mapping from dimension name to dimension value.
///
/// Keys are unique and iteration order is sorted by key, so two coordinate
/// sets built in different orders compare, hash and display identically.
///
/// # Example
///
/// ```
/// use coord_core::Coordinates;
///
/// let request: Coordinates = "{region=west, phase=experimental}".parse().unwrap();
/// let scope = Coordinates::from_pairs([("region", "west")]);
/// assert!(scope.is_subset_of(&request));
/// assert_eq!(request.to_string(), "{phase=experimental, region=west}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coordinates(BTreeMap<String, String>);

impl Coordinates {
    /// Create empty (unscoped) coordinates.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build coordinates from key/value pairs. Later duplicates win.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Set a dimension, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Get the value of a dimension.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no dimension is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every key/value pair of `self` also appears in `other`.
    ///
    /// Equal coordinates are subsets of each other; empty coordinates are a
    /// subset of everything.
    pub fn is_subset_of(&self, other: &Coordinates) -> bool {
        self.len() <= other.len()
            && self
                .0
                .iter()
                .all(|(key, value)| other.0.get(key) == Some(value))
    }

    /// Iterate over `(dimension, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Coordinates {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Coordinates {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<BTreeMap<String, String>> for Coordinates {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str("}")
    }
}

/// Error returned when a coordinates string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid coordinate entry {entry:?}: expected key=value")]
pub struct ParseCoordinatesError {
    pub entry: String,
}

impl FromStr for Coordinates {
    type Err = ParseCoordinatesError;

    /// Parse `{k1=v1, k2=v2}`. Braces are optional, whitespace around keys,
    /// values and entries is ignored, and empty entries are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut body = s.trim();
        if let Some(inner) = body.strip_prefix('{').and_then(|b| b.strip_suffix('}')) {
            body = inner.trim();
        }

        let mut coordinates = Coordinates::new();
        for entry in body.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry.split_once('=').ok_or_else(|| ParseCoordinatesError {
                entry: entry.to_string(),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ParseCoordinatesError {
                    entry: entry.to_string(),
                });
            }
            coordinates.insert(key, value.trim());
        }
        Ok(coordinates)
    }
}
