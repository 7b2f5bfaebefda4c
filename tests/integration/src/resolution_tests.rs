//! End-to-end resolution over TOML layers
//!
//! Exercises the engine with the built-in sources the way an application
//! wires them: layer files on disk, an engine config, and the process
//! sources for bootstrapping coordinates.

use coord_core::{
    Coordinates, Engine, EngineConfig, Error, Interpolator, Lookup, Result, Source,
};
use coord_sources::{CachingSource, CoordinatesSource, EnvironmentSource, PropertiesSource};
use coord_test_utils::{RecordingHandler, ReentrantSource, coords};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Layer files written into a temporary directory
struct Layers {
    dir: TempDir,
    sources: Vec<Arc<dyn Source>>,
}

impl Layers {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            sources: Vec::new(),
        }
    }

    /// Write `<id>.toml` scoped to `coordinates` with one `db.url` property.
    fn db_url(self, id: &str, coordinates: &[(&str, &str)], url: &str) -> Self {
        let mut body = String::from("[coordinates]\n");
        for (key, value) in coordinates {
            body.push_str(&format!("{key} = \"{value}\"\n"));
        }
        body.push_str(&format!("[properties]\n\"db.url\" = \"{url}\"\n"));
        self.file(id, &body)
    }

    fn file(mut self, id: &str, body: &str) -> Self {
        let path = self.dir.path().join(format!("{id}.toml"));
        fs::write(&path, body).unwrap();
        self.sources
            .push(Arc::new(PropertiesSource::load(&path).unwrap()));
        self
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn engine(&self) -> Engine {
        Engine::builder()
            .sources(self.sources.clone())
            .coordinates(Coordinates::new())
            .build()
            .unwrap()
    }
}

/// Expands `${name}` by resolving `name` at the request's coordinates.
/// Unknown names are left as written.
struct Placeholders;

impl Interpolator for Placeholders {
    fn interpolate(&self, lookup: &Lookup<'_>, coordinates: &Coordinates, raw: &str) -> Result<String> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find("${") {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let name = &rest[start + 2..start + len];
            out.push_str(&rest[..start]);
            match lookup.get_string(coordinates, name)? {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[start..=start + len]),
            }
            rest = &rest[start + len + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

// =============================================================================
// Selection scenarios
// =============================================================================

#[test]
fn exact_match_beats_a_value_that_does_not_apply() {
    let handler = RecordingHandler::new();
    let layers = Layers::new()
        .db_url("west", &[("region", "west")], "jdbc:west")
        .db_url("default", &[], "jdbc:default");
    let engine = Engine::builder()
        .sources(layers.sources.clone())
        .malformed_handler(handler.clone())
        .coordinates(Coordinates::new())
        .build()
        .unwrap();

    assert_eq!(
        engine.get_string(&coords("{}"), "db.url").unwrap().as_deref(),
        Some("jdbc:default")
    );
    let batches = handler.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].value.raw(), Some("jdbc:west"));
}

#[test]
fn more_specific_layer_wins() {
    let engine = Layers::new()
        .db_url("experimental", &[("phase", "experimental")], "jdbc:experimental")
        .db_url(
            "experimental-test",
            &[("environment", "test"), ("phase", "experimental")],
            "jdbc:experimental:test",
        )
        .engine();

    assert_eq!(
        engine
            .get_string(&coords("{environment=test, phase=experimental}"), "db.url")
            .unwrap()
            .as_deref(),
        Some("jdbc:experimental:test")
    );
}

#[test]
fn equally_specific_layers_are_ambiguous() {
    let engine = Layers::new()
        .db_url("west", &[("region", "west")], "jdbc:west")
        .db_url("experimental", &[("phase", "experimental")], "jdbc:experimental")
        .engine();

    let err = engine
        .get_string(&coords("{region=west, phase=experimental}"), "db.url")
        .unwrap_err();
    match err {
        Error::Ambiguous { name, values, .. } => {
            assert_eq!(name, "db.url");
            let mut raws: Vec<_> = values.iter().filter_map(|v| v.raw()).collect();
            raws.sort();
            assert_eq!(raws, vec!["jdbc:experimental", "jdbc:west"]);
        }
        other => panic!("expected ambiguity, got {other}"),
    }
}

#[test]
fn missing_converter_is_reported_even_when_sources_agree() {
    struct Dsn;

    let engine = Layers::new().db_url("default", &[], "jdbc:default").engine();
    let err = engine.get::<Dsn>(&coords("{}"), "db.url").err().unwrap();
    assert!(matches!(err, Error::NoConverter { .. }), "{err}");
}

#[test]
fn self_referential_source_sees_no_opinion_from_itself() {
    let templated = Arc::new(ReentrantSource::new("templated", "db.url", "db.url", "pooled:"));
    let layers = Layers::new().db_url("default", &[], "jdbc:default");
    let mut sources = layers.sources.clone();
    sources.push(templated.clone());
    let engine = Engine::builder()
        .sources(sources)
        .coordinates(Coordinates::new())
        .build()
        .unwrap();

    // The nested lookup sees only the default layer, so both answers are
    // exact matches at {} and tie.
    let err = engine.get_string(&coords("{}"), "db.url").unwrap_err();
    assert!(matches!(err, Error::Ambiguous { .. }), "{err}");
    assert_eq!(templated.calls(), 1);
    assert_eq!(templated.seen(), vec![Some("jdbc:default".to_string())]);
}

// =============================================================================
// Layer files and configuration
// =============================================================================

#[rstest]
#[case::unscoped("{}", "jdbc:default")]
#[case::region("{region=west}", "jdbc:west")]
#[case::region_and_environment("{region=west, environment=test}", "jdbc:west-test")]
#[case::extra_dimension("{region=west, environment=test, host=db1}", "jdbc:west-test")]
#[case::unknown_region("{region=east, environment=prod}", "jdbc:default")]
fn layered_lookup(#[case] request: &str, #[case] expected: &str) {
    let engine = Layers::new()
        .db_url("default", &[], "jdbc:default")
        .db_url("west", &[("region", "west")], "jdbc:west")
        .db_url("west-test", &[("region", "west"), ("environment", "test")], "jdbc:west-test")
        .engine();

    assert_eq!(
        engine.get_string(&coords(request), "db.url").unwrap().as_deref(),
        Some(expected)
    );
}

#[test]
fn engine_config_file_orders_sources() {
    let layers = Layers::new()
        .db_url("west", &[("region", "west")], "jdbc:west")
        .db_url("test", &[("environment", "test")], "jdbc:test");
    let config_path = layers.path().join("engine.toml");
    fs::write(
        &config_path,
        "source_order = [\"test\", \"west\"]\n\n[coordinates]\nregion = \"west\"\nenvironment = \"test\"\n",
    )
    .unwrap();
    let config = EngineConfig::load(&config_path).unwrap();

    let engine = Engine::builder()
        .sources(layers.sources.clone())
        .config(&config)
        .build()
        .unwrap();

    assert_eq!(engine.coordinates(), &coords("{region=west, environment=test}"));
    assert_eq!(engine.resolve::<String>("db.url").unwrap().as_deref(), Some("jdbc:test"));
}

#[test]
fn coordinates_are_bootstrapped_from_a_source() {
    let layers = Layers::new()
        .db_url("default", &[], "jdbc:default")
        .db_url("west", &[("region", "west")], "jdbc:west");
    let mut sources = layers.sources.clone();
    sources.push(Arc::new(CoordinatesSource::fixed("{region=west}")));

    let engine = Engine::builder().sources(sources).build().unwrap();

    assert_eq!(engine.coordinates(), &coords("{region=west}"));
    assert_eq!(engine.resolve::<String>("db.url").unwrap().as_deref(), Some("jdbc:west"));
}

#[test]
fn placeholders_resolve_through_the_engine() {
    let layers = Layers::new()
        .file(
            "default",
            "[properties]\n\"db.host\" = \"localhost\"\n\"db.port\" = 5432\n\"db.url\" = \"jdbc:${db.host}:${db.port}/${db.name}\"\n",
        )
        .file("west", "[coordinates]\nregion = \"west\"\n[properties]\n\"db.host\" = \"west.internal\"\n");
    let mut sources = layers.sources.clone();
    sources.push(Arc::new(EnvironmentSource::from_vars([("db.name", "orders")])));

    let engine = Engine::builder()
        .sources(sources)
        .interpolator(Placeholders)
        .coordinates(Coordinates::new())
        .build()
        .unwrap();

    assert_eq!(
        engine.get_string(&coords("{}"), "db.url").unwrap().as_deref(),
        Some("jdbc:localhost:5432/orders")
    );
    assert_eq!(
        engine.get_string(&coords("{region=west}"), "db.url").unwrap().as_deref(),
        Some("jdbc:west.internal:5432/orders")
    );
    assert_eq!(
        engine.get_or::<String>(&coords("{}"), "db.replica", "${db.host}:${db.missing}").unwrap().as_deref(),
        Some("localhost:${db.missing}")
    );
}

#[test]
fn self_referential_placeholder_is_left_as_written() {
    let layers = Layers::new().file("default", "[properties]\na = \"x${a}\"\n");
    let engine = Engine::builder()
        .sources(layers.sources.clone())
        .interpolator(Placeholders)
        .coordinates(Coordinates::new())
        .build()
        .unwrap();

    assert_eq!(
        engine.get_string(&coords("{}"), "a").unwrap().as_deref(),
        Some("x${a}")
    );
}

#[test]
fn placeholder_naming_its_own_property_extends_the_less_specific_layer() {
    let layers = Layers::new()
        .file("default", "[properties]\n\"db.options\" = \"ssl\"\n")
        .file(
            "west",
            "[coordinates]\nregion = \"west\"\n[properties]\n\"db.options\" = \"${db.options},pool\"\n",
        );
    let engine = Engine::builder()
        .sources(layers.sources.clone())
        .interpolator(Placeholders)
        .coordinates(Coordinates::new())
        .build()
        .unwrap();

    assert_eq!(
        engine.get_string(&coords("{region=west}"), "db.options").unwrap().as_deref(),
        Some("ssl,pool")
    );
    assert_eq!(
        engine.get_string(&coords("{}"), "db.options").unwrap().as_deref(),
        Some("ssl")
    );
}

#[test]
fn placeholder_cycle_across_layers_terminates() {
    let layers = Layers::new()
        .file("first", "[properties]\na = \"${b}\"\n")
        .file("second", "[properties]\nb = \"${a}\"\n");
    let engine = Engine::builder()
        .sources(layers.sources.clone())
        .interpolator(Placeholders)
        .coordinates(Coordinates::new())
        .build()
        .unwrap();

    assert_eq!(
        engine.get_string(&coords("{}"), "a").unwrap().as_deref(),
        Some("${a}")
    );
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn cached_layers_serve_concurrent_requests() {
    let layers = Layers::new();
    let west = layers.path().join("west.toml");
    fs::write(&west, "[coordinates]\nregion = \"west\"\n[properties]\n\"db.url\" = \"jdbc:west\"\n").unwrap();
    let default = layers.path().join("default.toml");
    fs::write(&default, "[properties]\n\"db.url\" = \"jdbc:default\"\n").unwrap();

    let cached = Arc::new(CachingSource::new(PropertiesSource::load(&west).unwrap()));
    let engine = Engine::builder()
        .source(PropertiesSource::load(&default).unwrap())
        .sources([cached.clone() as Arc<dyn Source>])
        .coordinates(Coordinates::new())
        .build()
        .unwrap();

    std::thread::scope(|scope| {
        for i in 0..8 {
            let engine = &engine;
            scope.spawn(move || {
                let (request, expected) = if i % 2 == 0 {
                    ("{region=west}", "jdbc:west")
                } else {
                    ("{region=east}", "jdbc:default")
                };
                for _ in 0..50 {
                    assert_eq!(
                        engine.get_string(&coords(request), "db.url").unwrap().as_deref(),
                        Some(expected)
                    );
                }
            });
        }
    });

    // one entry per distinct request
    assert_eq!(cached.len(), 2);
}
