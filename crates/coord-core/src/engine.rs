//! The resolution engine
//!
//! The `Engine` queries every source once per request, validates and buckets
//! the answers, applies the specificity rule, falls back to arbiters on
//! ties, and finally converts the winning string to the requested type.

use crate::arbiter::{Arbiter, RankedArbiter};
use crate::config::{EngineConfig, ExactMatchPolicy};
use crate::convert::{Converter, ConverterRegistry};
use crate::coordinates::Coordinates;
use crate::error::{Error, Result};
use crate::interpolate::{Interpolator, Verbatim};
use crate::malformed::{DiscardMalformed, MalformedHandler};
use crate::select::{Candidates, Selection};
use crate::source::{Lookup, Source};
use crate::value::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Name of the property holding the engine's default coordinates.
pub const CONFIGURATION_COORDINATES: &str = "configurationCoordinates";

/// Resolves named properties against a fixed set of sources.
///
/// Sources, arbiters and converters are frozen when the engine is built, so
/// an `Engine` can be shared between threads and queried concurrently
/// without locking. Each request keeps its own transient state.
pub struct Engine {
    sources: Vec<Arc<dyn Source>>,
    arbiters: Vec<Arc<dyn Arbiter>>,
    converters: ConverterRegistry,
    interpolator: Arc<dyn Interpolator>,
    malformed_handler: Arc<dyn MalformedHandler>,
    exact_match_policy: ExactMatchPolicy,
    coordinates: Coordinates,
}

impl Engine {
    /// Start building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Default coordinates used by [`Engine::resolve`].
    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn exact_match_policy(&self) -> ExactMatchPolicy {
        self.exact_match_policy
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Resolve `name` at `coordinates` and convert it to `T`.
    ///
    /// Returns whatever the converter makes of the selected string; the
    /// built-in converters yield `Ok(None)` when no source had a value.
    ///
    /// # Errors
    ///
    /// - [`Error::NoConverter`] if `T` has no converter (checked before any
    ///   source is queried)
    /// - [`Error::Ambiguous`] if equally specific values tie and no arbiter
    ///   resolves them
    /// - [`Error::DuplicateExactMatch`] under [`ExactMatchPolicy::Reject`]
    /// - [`Error::Conversion`] or any error raised by a source
    pub fn get<T: 'static>(&self, coordinates: &Coordinates, name: &str) -> Result<Option<T>> {
        let lookup = Lookup::new(self);
        self.get_in(&lookup, coordinates, name, None)
    }

    /// Like [`Engine::get`], converting `default` when no value (or no
    /// payload) was selected.
    pub fn get_or<T: 'static>(&self, coordinates: &Coordinates, name: &str, default: &str) -> Result<Option<T>> {
        let lookup = Lookup::new(self);
        self.get_in(&lookup, coordinates, name, Some(default))
    }

    /// Resolve `name` at `coordinates` as a string.
    pub fn get_string(&self, coordinates: &Coordinates, name: &str) -> Result<Option<String>> {
        self.get::<String>(coordinates, name)
    }

    /// Resolve `name` at the engine's default coordinates.
    pub fn resolve<T: 'static>(&self, name: &str) -> Result<Option<T>> {
        self.get(&self.coordinates, name)
    }

    /// Select the winning value without converting it.
    pub fn select(&self, coordinates: &Coordinates, name: &str) -> Result<Option<Value>> {
        validate_name(name)?;
        let lookup = Lookup::new(self);
        Ok(self.select_in(&lookup, coordinates, name)?.map(|s| s.value))
    }

    /// Union of the names the sources advertise. Best effort: sources may
    /// answer for names they do not list.
    pub fn known_names(&self) -> BTreeSet<String> {
        self.sources.iter().flat_map(|s| s.names()).collect()
    }

    /// Names of the types this engine can convert to.
    pub fn conversion_types(&self) -> Vec<&'static str> {
        self.converters.type_names()
    }

    /// Like [`Engine::get`], also returning the selected value so a caller
    /// can report where the result came from. Sources are queried once.
    pub fn get_selected<T: 'static>(
        &self,
        coordinates: &Coordinates,
        name: &str,
        default: Option<&str>,
    ) -> Result<(Option<Value>, Option<T>)> {
        let lookup = Lookup::new(self);
        self.resolve_in(&lookup, coordinates, name, default)
    }

    pub(crate) fn get_in<T: 'static>(
        &self,
        lookup: &Lookup<'_>,
        coordinates: &Coordinates,
        name: &str,
        default: Option<&str>,
    ) -> Result<Option<T>> {
        self.resolve_in(lookup, coordinates, name, default)
            .map(|(_, converted)| converted)
    }

    fn resolve_in<T: 'static>(
        &self,
        lookup: &Lookup<'_>,
        coordinates: &Coordinates,
        name: &str,
        default: Option<&str>,
    ) -> Result<(Option<Value>, Option<T>)> {
        validate_name(name)?;
        let converter = self.converters.get::<T>().ok_or(Error::NoConverter {
            type_name: std::any::type_name::<T>(),
        })?;

        let selected = self.select_in(lookup, coordinates, name)?;
        let raw = match selected.as_ref().and_then(|s| s.value.raw()).or(default) {
            Some(raw) => {
                // Nested lookups of `name` skip the source that produced it.
                let _expansion = selected
                    .as_ref()
                    .and_then(|s| s.slot)
                    .and_then(|slot| lookup.expand(slot, name));
                Some(self.interpolator.interpolate(lookup, coordinates, raw)?)
            }
            None => None,
        };
        let converted = converter.convert(raw.as_deref())?;
        Ok((selected.map(|s| s.value), converted))
    }

    fn select_in(&self, lookup: &Lookup<'_>, coordinates: &Coordinates, name: &str) -> Result<Option<Selected>> {
        let mut candidates = Candidates::new(coordinates, name);
        let mut answered: Vec<(usize, Value)> = Vec::new();

        for (slot, source) in self.sources.iter().enumerate() {
            if lookup.is_expanding(slot, name) {
                tracing::trace!(source = %source.info(), name, "Source value being interpolated, skipping");
                continue;
            }
            let Some(_activation) = lookup.activate(slot) else {
                tracing::trace!(source = %source.info(), name, "Source already active, skipping");
                continue;
            };
            if let Some(value) = source.query(lookup, coordinates, name)? {
                tracing::trace!(%value, "Source answered");
                answered.push((slot, value.clone()));
                candidates.offer(value);
            }
        }

        let malformed = candidates.take_malformed();
        if !malformed.is_empty() {
            for rejected in &malformed {
                tracing::debug!(value = %rejected.value, reason = %rejected.reason, "Malformed value");
            }
            self.malformed_handler.handle(coordinates, name, &malformed);
        }

        if self.exact_match_policy == ExactMatchPolicy::Reject && candidates.exact_matches().len() > 1 {
            return Err(Error::DuplicateExactMatch {
                coordinates: coordinates.clone(),
                name: name.to_string(),
                values: candidates.exact_matches().to_vec(),
            });
        }

        let value = match candidates.decide() {
            Selection::Empty => {
                tracing::debug!(name, %coordinates, "No value");
                return Ok(None);
            }
            Selection::Winner(value) => {
                tracing::debug!(name, %coordinates, %value, "Selected");
                value
            }
            Selection::Tied(tied) => self.arbitrate(coordinates, name, tied)?,
        };
        let slot = answered
            .iter()
            .find(|(_, answer)| answer.source() == value.source() && *answer == value)
            .map(|(slot, _)| *slot);
        Ok(Some(Selected { value, slot }))
    }

    fn arbitrate(&self, coordinates: &Coordinates, name: &str, tied: Vec<Value>) -> Result<Value> {
        tracing::debug!(name, %coordinates, count = tied.len(), "Arbitrating tied values");
        for arbiter in &self.arbiters {
            if let Some(value) = arbiter.arbitrate(coordinates, name, &tied) {
                tracing::debug!(name, %coordinates, %value, "Arbiter selected");
                return Ok(value);
            }
        }
        Err(Error::Ambiguous {
            coordinates: coordinates.clone(),
            name: name.to_string(),
            values: tied,
        })
    }
}

/// The winning value and the slot of the source that produced it.
struct Selected {
    value: Value,
    slot: Option<usize>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<&str> = self.sources.iter().map(|s| s.info().id()).collect();
        f.debug_struct("Engine")
            .field("sources", &sources)
            .field("arbiters", &self.arbiters.len())
            .field("converters", &self.converters)
            .field("exact_match_policy", &self.exact_match_policy)
            .field("coordinates", &self.coordinates)
            .finish()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Assembles an [`Engine`].
///
/// Starts with the built-in converters, no sources, no arbiters, verbatim
/// interpolation and a malformed handler that discards.
pub struct EngineBuilder {
    sources: Vec<Arc<dyn Source>>,
    arbiters: Vec<Arc<dyn Arbiter>>,
    converters: ConverterRegistry,
    interpolator: Arc<dyn Interpolator>,
    malformed_handler: Arc<dyn MalformedHandler>,
    exact_match_policy: ExactMatchPolicy,
    coordinates: Option<Coordinates>,
    source_order: Vec<String>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            arbiters: Vec::new(),
            converters: ConverterRegistry::with_builtins(),
            interpolator: Arc::new(Verbatim),
            malformed_handler: Arc::new(DiscardMalformed),
            exact_match_policy: ExactMatchPolicy::default(),
            coordinates: None,
            source_order: Vec::new(),
        }
    }

    /// Add a source. Sources are queried in the order they are added.
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Add already shared sources.
    pub fn sources(mut self, sources: impl IntoIterator<Item = Arc<dyn Source>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Add an arbiter. Arbiters are consulted in the order they are added.
    pub fn arbiter(mut self, arbiter: impl Arbiter + 'static) -> Self {
        self.arbiters.push(Arc::new(arbiter));
        self
    }

    /// Replace the converter registry.
    pub fn converters(mut self, converters: ConverterRegistry) -> Self {
        self.converters = converters;
        self
    }

    /// Register (or replace) the converter for `T`.
    pub fn converter<T, C>(mut self, converter: C) -> Self
    where
        T: 'static,
        C: Converter<T> + 'static,
    {
        self.converters.register::<T, C>(converter);
        self
    }

    pub fn interpolator(mut self, interpolator: impl Interpolator + 'static) -> Self {
        self.interpolator = Arc::new(interpolator);
        self
    }

    pub fn malformed_handler(mut self, handler: impl MalformedHandler + 'static) -> Self {
        self.malformed_handler = Arc::new(handler);
        self
    }

    pub fn exact_match_policy(mut self, policy: ExactMatchPolicy) -> Self {
        self.exact_match_policy = policy;
        self
    }

    /// Set the default coordinates, skipping the bootstrap lookup.
    pub fn coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Apply declarative settings.
    pub fn config(mut self, config: &EngineConfig) -> Self {
        self.exact_match_policy = config.exact_match_policy;
        if let Some(coordinates) = &config.coordinates {
            self.coordinates = Some(coordinates.clone());
        }
        self.source_order = config.source_order.clone();
        self
    }

    /// Freeze the collections and build the engine.
    ///
    /// Without explicit coordinates, the default coordinates are read from
    /// the [`CONFIGURATION_COORDINATES`] property at empty coordinates and
    /// parsed as `{key=value, ...}`; absent means empty.
    pub fn build(mut self) -> Result<Engine> {
        if !self.source_order.is_empty() {
            self.arbiters
                .push(Arc::new(RankedArbiter::with_order(self.source_order)));
        }

        let explicit = self.coordinates;
        let mut engine = Engine {
            sources: self.sources,
            arbiters: self.arbiters,
            converters: self.converters,
            interpolator: self.interpolator,
            malformed_handler: self.malformed_handler,
            exact_match_policy: self.exact_match_policy,
            coordinates: explicit.clone().unwrap_or_default(),
        };

        if explicit.is_none() {
            let bootstrapped = engine.select(&Coordinates::new(), CONFIGURATION_COORDINATES)?;
            if let Some(raw) = bootstrapped.as_ref().and_then(Value::raw) {
                engine.coordinates = raw
                    .parse()
                    .map_err(|e| Error::conversion::<Coordinates>(raw, e))?;
            }
        }

        tracing::debug!(
            sources = engine.sources.len(),
            arbiters = engine.arbiters.len(),
            coordinates = %engine.coordinates,
            "Engine built"
        );
        Ok(engine)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
