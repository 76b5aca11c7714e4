//! Scenario runner for the Nucleus simulation kernel.
//!
//! # Startup Sequence
//!
//! 1. Load the scenario from the path given as the first argument
//!    (default `nucleus-scenario.yaml`), or use defaults if it is missing
//! 2. Initialize structured logging (tracing)
//! 3. Build people, regions, and report plugins and resolve their order
//! 4. Initialize, then execute every planned move
//! 5. Print the report as JSON on stdout

mod config;
mod error;
mod report;
mod scenario;

use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LOG_LEVEL_ENV, LoggingConfig, ScenarioConfig};
use crate::error::EngineError;

/// Scenario file read when no path is given.
const DEFAULT_SCENARIO: &str = "nucleus-scenario.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or the simulation
/// fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_SCENARIO), PathBuf::from);
    let (config, loaded) = load_config(&path)?;

    init_tracing(&config.logging);
    info!("nucleus-engine starting");
    if loaded {
        info!(path = %path.display(), moves = config.moves.len(), "Scenario loaded");
    } else {
        info!(path = %path.display(), "Scenario file not found, using defaults");
    }

    let report = scenario::run(&config)?;
    println!("{}", serde_json::to_string_pretty(&report).map_err(EngineError::from)?);
    info!(moves = report.moves, population = report.population, "nucleus-engine finished");
    Ok(())
}

/// Load the scenario at `path`, falling back to defaults if the file does
/// not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(ScenarioConfig, bool), EngineError> {
    if path.exists() {
        Ok((ScenarioConfig::from_file(path)?, true))
    } else {
        Ok((ScenarioConfig::default(), false))
    }
}

/// `RUST_LOG` wins; otherwise `NUCLEUS_LOG_LEVEL`, then `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let level = logging.resolve_level(std::env::var(LOG_LEVEL_ENV).ok());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
