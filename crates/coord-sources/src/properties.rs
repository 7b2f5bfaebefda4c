//! Fixed property tables scoped to fixed coordinates
//!
//! A layer file looks like:
//!
//! ```toml
//! rank = 50
//! authoritative = false
//!
//! [coordinates]
//! region = "west"
//!
//! [properties]
//! "db.url" = "jdbc:west"
//! "pool.size" = 8
//! "hosts" = ["a", "b"]
//! ```
//!
//! Scalars are stored in their TOML text form; arrays of scalars are joined
//! with `,` so the list converters can read them back.

use crate::error::{Error, Result};
use coord_core::{Coordinates, Lookup, Source, SourceInfo, Value};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Rank given to properties sources unless the layer says otherwise.
pub const DEFAULT_RANK: u32 = 100;

/// A table of properties that all share one set of coordinates.
#[derive(Debug, Clone)]
pub struct PropertiesSource {
    info: SourceInfo,
    coordinates: Coordinates,
    properties: BTreeMap<String, String>,
    authoritative: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LayerFile {
    rank: Option<u32>,
    authoritative: bool,
    coordinates: Coordinates,
    properties: BTreeMap<String, toml::Value>,
}

impl PropertiesSource {
    /// An empty, unscoped source with the default rank.
    pub fn new(id: &str) -> Self {
        Self {
            info: SourceInfo::new(id).with_rank(DEFAULT_RANK),
            coordinates: Coordinates::new(),
            properties: BTreeMap::new(),
            authoritative: false,
        }
    }

    pub fn scoped(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = coordinates;
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.info = self.info.with_rank(rank);
        self
    }

    pub fn authoritative(mut self, authoritative: bool) -> Self {
        self.authoritative = authoritative;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.insert(name, raw);
        self
    }

    /// Add or replace a property.
    pub fn insert(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        self.properties.insert(name.into(), raw.into());
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Parse a layer from TOML text.
    pub fn from_toml_str(id: &str, text: &str) -> Result<Self> {
        Self::parse_layer(id, id, text)
    }

    /// Load a layer file. The source id is the file stem.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let source = Self::parse_layer(&id, &path.display().to_string(), &text)?;
        tracing::debug!(
            path = %path.display(),
            id = %id,
            coordinates = %source.coordinates,
            properties = source.len(),
            "Loaded properties layer"
        );
        Ok(source)
    }

    fn parse_layer(id: &str, origin: &str, text: &str) -> Result<Self> {
        let layer: LayerFile = toml::from_str(text).map_err(|e| Error::invalid_layer(origin, e))?;

        let mut source = Self::new(id)
            .scoped(layer.coordinates)
            .authoritative(layer.authoritative);
        if let Some(rank) = layer.rank {
            source = source.with_rank(rank);
        }
        for (name, value) in layer.properties {
            let raw = render(&value)
                .ok_or_else(|| Error::invalid_layer(origin, format!("property {name:?} must be a scalar or a list of scalars")))?;
            source.insert(name, raw);
        }
        Ok(source)
    }
}

fn render(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                toml::Value::Array(_) | toml::Value::Table(_) => None,
                scalar => render(scalar),
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        toml::Value::Table(_) => None,
    }
}

impl Source for PropertiesSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn query(
        &self,
        _lookup: &Lookup<'_>,
        _coordinates: &Coordinates,
        name: &str,
    ) -> coord_core::Result<Option<Value>> {
        Ok(self.properties.get(name).map(|raw| {
            Value::new(&self.info, self.coordinates.clone(), name, Some(raw.clone()))
                .authoritative(self.authoritative)
        }))
    }

    fn names(&self) -> BTreeSet<String> {
        self.properties.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coord_test_utils::coords;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_from_toml_str() {
        let source = PropertiesSource::from_toml_str(
            "west",
            r#"
rank = 10
authoritative = true

[coordinates]
region = "west"

[properties]
"db.url" = "jdbc:west"
"pool.size" = 8
"#,
        )
        .unwrap();

        assert_eq!(source.info().id(), "west");
        assert_eq!(source.info().rank(), Some(10));
        assert_eq!(source.coordinates(), &coords("{region=west}"));
        assert_eq!(source.property("db.url"), Some("jdbc:west"));
        assert_eq!(source.property("pool.size"), Some("8"));
        assert!(source.authoritative);
    }

    #[test]
    fn test_empty_layer_uses_defaults() {
        let source = PropertiesSource::from_toml_str("empty", "").unwrap();
        assert_eq!(source.info().rank(), Some(DEFAULT_RANK));
        assert!(source.coordinates().is_empty());
        assert!(source.is_empty());
    }

    #[rstest]
    #[case::string(r#"v = "x""#, "x")]
    #[case::integer("v = -3", "-3")]
    #[case::boolean("v = true", "true")]
    #[case::float("v = 1.5", "1.5")]
    #[case::list(r#"v = ["a", "b"]"#, "a,b")]
    #[case::int_list("v = [1, 2, 3]", "1,2,3")]
    fn test_property_rendering(#[case] line: &str, #[case] expected: &str) {
        let text = format!("[properties]\n{line}\n");
        let source = PropertiesSource::from_toml_str("t", &text).unwrap();
        assert_eq!(source.property("v"), Some(expected));
    }

    #[rstest]
    #[case::nested_table("[properties.v]\nx = 1\n")]
    #[case::nested_list("[properties]\nv = [[1], [2]]\n")]
    #[case::unknown_key("colour = \"red\"\n")]
    #[case::not_toml("[properties\n")]
    fn test_invalid_layers(#[case] text: &str) {
        let err = PropertiesSource::from_toml_str("bad", text).unwrap_err();
        assert!(matches!(err, Error::InvalidLayer { ref origin, .. } if origin == "bad"));
    }

    #[test]
    fn test_load_uses_file_stem_as_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("west-test.toml");
        fs::write(&path, "[coordinates]\nregion = \"west\"\n[properties]\nkey = \"v\"\n").unwrap();

        let source = PropertiesSource::load(&path).unwrap();
        assert_eq!(source.info().id(), "west-test");
        assert_eq!(source.names(), BTreeSet::from(["key".to_string()]));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PropertiesSource::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
