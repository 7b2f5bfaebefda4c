//! Process environment variables as an unscoped source

use coord_core::{Coordinates, Lookup, Source, SourceInfo, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Rank given to the environment source.
pub const DEFAULT_RANK: u32 = 200;

#[derive(Debug, Clone)]
enum Vars {
    Live,
    Snapshot(BTreeMap<String, String>),
}

/// Answers a property with the environment variable of the same name.
///
/// Values are unscoped and never authoritative, so any properties source
/// scoped to the request outranks them.
#[derive(Debug, Clone)]
pub struct EnvironmentSource {
    info: SourceInfo,
    vars: Vars,
}

impl EnvironmentSource {
    /// Read the live process environment on every query.
    pub fn new() -> Self {
        Self {
            info: SourceInfo::new("environment").with_rank(DEFAULT_RANK),
            vars: Vars::Live,
        }
    }

    /// Answer from a fixed set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            info: SourceInfo::new("environment").with_rank(DEFAULT_RANK),
            vars: Vars::Snapshot(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        let info = SourceInfo::new(id);
        self.info = match self.info.rank() {
            Some(rank) => info.with_rank(rank),
            None => info,
        };
        self
    }

    fn var(&self, name: &str) -> Option<String> {
        match &self.vars {
            // Non-unicode values are treated as absent.
            Vars::Live => std::env::var(name).ok(),
            Vars::Snapshot(vars) => vars.get(name).cloned(),
        }
    }
}

impl Default for EnvironmentSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for EnvironmentSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn query(
        &self,
        _lookup: &Lookup<'_>,
        _coordinates: &Coordinates,
        name: &str,
    ) -> coord_core::Result<Option<Value>> {
        if name.contains('=') || name.contains('\0') {
            return Ok(None);
        }
        let value = self.var(name);
        if value.is_some() {
            tracing::trace!(name, "Environment variable found");
        }
        Ok(value.map(|raw| Value::new(&self.info, Coordinates::new(), name, Some(raw))))
    }

    fn names(&self) -> BTreeSet<String> {
        match &self.vars {
            Vars::Live => std::env::vars_os()
                .filter_map(|(k, _)| k.into_string().ok())
                .collect(),
            Vars::Snapshot(vars) => vars.keys().cloned().collect(),
        }
    }
}
