//! coord CLI
//!
//! Resolves configuration properties from TOML layers and the process
//! environment at a given set of coordinates.

mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use clap::Parser;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {}", e);
    }
    tracing::debug!(layers = cli.layers.len(), no_env = cli.no_env, "Starting");

    let engine = settings::build_engine(&cli)?;
    execute_command(&engine, cli.command)
}

fn execute_command(engine: &coord_core::Engine, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Get {
            name,
            coordinates,
            value_type,
            default,
            json,
        } => commands::run_get(engine, &name, &coordinates, value_type, default.as_deref(), json),
        Commands::Names => commands::run_names(engine),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }
}
