//! Memoizing wrapper around another source

use coord_core::{Coordinates, Lookup, Source, SourceInfo, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

type Key = (Coordinates, String);

/// Remembers the answers of an inner source per `(coordinates, name)`.
///
/// "No opinion" is remembered too. Failed queries are not, so the next
/// request retries them. Neither are answers given to nested requests
/// ([`Lookup::is_nested`]): those see only part of the sources, and an inner
/// source that re-enters the engine may answer differently at top level.
///
/// The inner source is queried without any lock held, which lets it re-enter
/// the engine; two threads racing on the same key may both query it, and the
/// first answer stored wins.
///
/// Entries are never evicted. Every distinct requested coordinate set adds
/// one per name, so wrap sources that see a bounded set of coordinates, or
/// call [`CachingSource::clear`] periodically.
#[derive(Debug)]
pub struct CachingSource<S> {
    inner: S,
    cache: RwLock<HashMap<Key, Option<Value>>>,
}

impl<S: Source> CachingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of remembered answers.
    pub fn len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every remembered answer.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    fn cached(&self, key: &Key) -> Option<Option<Value>> {
        self.cache.read().ok()?.get(key).cloned()
    }
}

impl<S: Source> Source for CachingSource<S> {
    fn info(&self) -> &SourceInfo {
        self.inner.info()
    }

    fn query(
        &self,
        lookup: &Lookup<'_>,
        coordinates: &Coordinates,
        name: &str,
    ) -> coord_core::Result<Option<Value>> {
        let key = (coordinates.clone(), name.to_string());
        if let Some(answer) = self.cached(&key) {
            tracing::trace!(source = %self.info(), name, "Cache hit");
            return Ok(answer);
        }

        let answer = self.inner.query(lookup, coordinates, name)?;
        if lookup.is_nested() {
            tracing::trace!(source = %self.info(), name, "Nested request, not caching");
            return Ok(answer);
        }
        match self.cache.write() {
            Ok(mut cache) => Ok(cache.entry(key).or_insert(answer).clone()),
            Err(_) => Ok(answer),
        }
    }

    fn names(&self) -> BTreeSet<String> {
        self.inner.names()
    }
}
