//! The --config file and source assembly
//!
//! ```toml
//! layers = ["defaults.toml", "west.toml"]
//! environment = false
//! exact_match_policy = "reject"
//! source_order = ["west", "defaults"]
//! rank_ties = true
//!
//! [coordinates]
//! region = "west"
//! ```
//!
//! Layer paths are relative to the config file.

use crate::cli::Cli;
use crate::error::{CliError, Result};
use coord_core::{Engine, EngineConfig, RankedArbiter, Source};
use coord_sources::{CoordinatesSource, EnvironmentSource, PropertiesSource};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Contents of the --config file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub engine: EngineConfig,

    /// Layer files, queried before any given with -l
    pub layers: Vec<PathBuf>,

    /// Whether to read the process environment; defaults to true
    pub environment: Option<bool>,

    /// Break ties left over after `source_order` by source rank
    pub rank_ties: bool,
}

impl Settings {
    /// Load a config file, resolving layer paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut settings: Settings = toml::from_str(&content).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for layer in &mut settings.layers {
            if layer.is_relative() {
                *layer = base.join(&*layer);
            }
        }
        tracing::debug!(path = %path.display(), layers = settings.layers.len(), "Loaded config file");
        Ok(settings)
    }
}

/// Build the engine described by the command line.
///
/// Sources are the config file's layers, then the -l layers, then unless
/// disabled the environment and coordinates sources. Ties go to the
/// configured source order first, then optionally to source rank.
pub fn build_engine(cli: &Cli) -> Result<Engine> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let mut sources: Vec<Arc<dyn Source>> = Vec::new();
    for path in settings.layers.iter().chain(&cli.layers) {
        if !path.exists() {
            return Err(CliError::user(format!("Layer file not found: {}", path.display())));
        }
        sources.push(Arc::new(PropertiesSource::load(path)?));
    }
    if settings.environment.unwrap_or(true) && !cli.no_env {
        sources.push(Arc::new(EnvironmentSource::new()));
        sources.push(Arc::new(CoordinatesSource::from_env()));
    }

    // Source order is consulted before rank.
    let mut engine_config = settings.engine.clone();
    let source_order = std::mem::take(&mut engine_config.source_order);
    let mut builder = Engine::builder().sources(sources).config(&engine_config);
    if !source_order.is_empty() {
        builder = builder.arbiter(RankedArbiter::with_order(source_order));
    }
    if settings.rank_ties || cli.rank_ties {
        builder = builder.arbiter(RankedArbiter::by_source_rank());
    }
    Ok(builder.build()?)
}
