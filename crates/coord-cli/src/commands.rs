//! Command implementations

use crate::cli::ValueType;
use crate::error::Result;
use coord_core::{Coordinates, Engine};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A resolved value in one of the command-line types
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Path(PathBuf),
    List(Vec<String>),
    Coordinates(Coordinates),
}

impl Resolved {
    fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::String(s) => Json::String(s.clone()),
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or_else(|| Json::String(f.to_string())),
            Self::Path(p) => Json::String(p.display().to_string()),
            Self::List(items) => Json::from(items.clone()),
            Self::Coordinates(c) => c
                .iter()
                .map(|(k, v)| (k.to_string(), Json::String(v.to_string())))
                .collect::<serde_json::Map<_, _>>()
                .into(),
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::List(items) => f.write_str(&items.join(",")),
            Self::Coordinates(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Serialize)]
struct GetOutput<'a> {
    name: &'a str,
    coordinates: &'a Coordinates,
    value: serde_json::Value,
    source: Option<String>,
}

/// Merge `overrides` onto the engine's default coordinates.
pub fn request_coordinates(engine: &Engine, overrides: &[(String, String)]) -> Coordinates {
    let mut coordinates = engine.coordinates().clone();
    for (key, value) in overrides {
        coordinates.insert(key.as_str(), value.as_str());
    }
    coordinates
}

/// Outcome of one lookup: the converted value and the id of the source
/// that produced the selected value
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: Option<Resolved>,
    pub source: Option<String>,
}

/// Resolve `name` at `coordinates` as `value_type`, querying the sources once.
pub fn resolve(
    engine: &Engine,
    coordinates: &Coordinates,
    name: &str,
    value_type: ValueType,
    default: Option<&str>,
) -> Result<Resolution> {
    fn fetch<T: 'static>(
        engine: &Engine,
        coordinates: &Coordinates,
        name: &str,
        default: Option<&str>,
        wrap: fn(T) -> Resolved,
    ) -> coord_core::Result<Resolution> {
        let (selected, converted) = engine.get_selected::<T>(coordinates, name, default)?;
        Ok(Resolution {
            value: converted.map(wrap),
            source: selected.map(|value| value.source().id().to_string()),
        })
    }

    let resolution = match value_type {
        ValueType::String => fetch(engine, coordinates, name, default, Resolved::String)?,
        ValueType::Bool => fetch(engine, coordinates, name, default, Resolved::Bool)?,
        ValueType::Int => fetch(engine, coordinates, name, default, Resolved::Int)?,
        ValueType::Float => fetch(engine, coordinates, name, default, Resolved::Float)?,
        ValueType::Path => fetch(engine, coordinates, name, default, Resolved::Path)?,
        ValueType::List => fetch(engine, coordinates, name, default, Resolved::List)?,
        ValueType::Coordinates => {
            fetch(engine, coordinates, name, default, Resolved::Coordinates)?
        }
    };
    Ok(resolution)
}

/// `coord get`
pub fn run_get(
    engine: &Engine,
    name: &str,
    overrides: &[(String, String)],
    value_type: ValueType,
    default: Option<&str>,
    json: bool,
) -> Result<()> {
    let coordinates = request_coordinates(engine, overrides);
    let resolution = resolve(engine, &coordinates, name, value_type, default)?;

    if json {
        let output = GetOutput {
            name,
            coordinates: &coordinates,
            value: resolution
                .value
                .as_ref()
                .map_or(serde_json::Value::Null, Resolved::to_json),
            source: resolution.source,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if let Some(resolved) = resolution.value {
        println!("{resolved}");
    }
    Ok(())
}

/// `coord names`
pub fn run_names(engine: &Engine) -> Result<()> {
    for name in engine.known_names() {
        println!("{name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coord_core::Source;
    use coord_sources::PropertiesSource;
    use coord_test_utils::ScriptedSource;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn engine() -> Engine {
        Engine::builder()
            .source(
                PropertiesSource::from_toml_str(
                    "app",
                    "[properties]\nport = 8080\nratio = 0.5\nhosts = [\"a\", \"b\"]\nhome = \"/srv\"\nscope = \"{region=west}\"\n",
                )
                .unwrap(),
            )
            .coordinates(Coordinates::from_pairs([("region", "west")]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_request_coordinates_overlay_defaults() {
        let engine = engine();
        let coordinates = request_coordinates(
            &engine,
            &[("environment".to_string(), "test".to_string()), ("region".to_string(), "east".to_string())],
        );
        assert_eq!(coordinates.to_string(), "{environment=test, region=east}");
    }

    #[test]
    fn test_resolve_types() {
        let engine = engine();
        let at = engine.coordinates().clone();
        let get = |name, value_type| resolve(&engine, &at, name, value_type, None).unwrap().value;

        assert_eq!(get("port", ValueType::Int), Some(Resolved::Int(8080)));
        assert_eq!(get("ratio", ValueType::Float), Some(Resolved::Float(0.5)));
        assert_eq!(get("home", ValueType::Path), Some(Resolved::Path(PathBuf::from("/srv"))));
        assert_eq!(
            get("hosts", ValueType::List),
            Some(Resolved::List(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(
            get("scope", ValueType::Coordinates),
            Some(Resolved::Coordinates(Coordinates::from_pairs([("region", "west")])))
        );
        assert_eq!(get("missing", ValueType::String), None);
    }

    #[test]
    fn test_resolve_default() {
        let engine = engine();
        let resolution = resolve(&engine, engine.coordinates(), "missing", ValueType::Bool, Some("true")).unwrap();
        assert_eq!(
            resolution,
            Resolution {
                value: Some(Resolved::Bool(true)),
                source: None,
            }
        );
    }

    #[test]
    fn test_resolve_reports_source_from_a_single_query() {
        let scripted = Arc::new(
            ScriptedSource::new("remote")
                .scoped("{region=west}")
                .answer("port", "9090"),
        );
        let engine = Engine::builder()
            .sources([scripted.clone() as Arc<dyn Source>])
            .coordinates(Coordinates::from_pairs([("region", "west")]))
            .build()
            .unwrap();

        let resolution = resolve(&engine, engine.coordinates(), "port", ValueType::Int, None).unwrap();
        assert_eq!(resolution.value, Some(Resolved::Int(9090)));
        assert_eq!(resolution.source.as_deref(), Some("remote"));
        assert_eq!(scripted.calls(), 1);
    }

    #[test]
    fn test_resolve_conversion_error() {
        let engine = engine();
        let err = resolve(&engine, engine.coordinates(), "home", ValueType::Int, None).unwrap_err();
        assert!(err.to_string().contains("/srv"), "{err}");
    }

    #[test]
    fn test_json_rendering() {
        assert_eq!(Resolved::Int(3).to_json(), serde_json::json!(3));
        assert_eq!(
            Resolved::List(vec!["a".to_string()]).to_json(),
            serde_json::json!(["a"])
        );
        assert_eq!(
            Resolved::Coordinates(Coordinates::from_pairs([("region", "west")])).to_json(),
            serde_json::json!({"region": "west"})
        );
        assert_eq!(Resolved::Float(f64::NAN).to_json(), serde_json::json!("NaN"));
    }
}
