//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Resolve coordinate-scoped configuration values from layered sources
#[derive(Parser, Debug)]
#[command(name = "coord")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine config file (coordinates, policy, source order, layers)
    #[arg(long, global = true, env = "COORD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Properties layer file; may be repeated, later layers are appended
    #[arg(short, long = "layer", global = true)]
    pub layers: Vec<PathBuf>,

    /// Do not read the process environment
    #[arg(long, global = true)]
    pub no_env: bool,

    /// Break remaining ties by source rank (layers 100, environment 200)
    #[arg(long, global = true)]
    pub rank_ties: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a property
    ///
    /// Examples:
    ///   coord -l defaults.toml -l west.toml get db.url -c region=west
    ///   coord get pool.size --type int --default 4
    ///   coord get db.url --json
    Get {
        /// Property name
        name: String,

        /// Coordinate overriding the engine's defaults (key=value)
        #[arg(short = 'c', long = "coordinate", value_parser = parse_coordinate)]
        coordinates: Vec<(String, String)>,

        /// Type to convert the value to
        #[arg(short, long = "type", value_enum, default_value_t = ValueType::String)]
        value_type: ValueType,

        /// Value to use when no source has one
        #[arg(short, long)]
        default: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List the property names the sources know about
    Names,
}

/// Conversion targets offered on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Bool,
    Int,
    Float,
    Path,
    List,
    Coordinates,
}

fn parse_coordinate(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got {s:?}")),
    }
}
