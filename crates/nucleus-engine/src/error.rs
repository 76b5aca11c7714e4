//! Error types for the engine binary.

use nucleus_core::{ConfigError, ContractError};

/// Top-level error for a scenario run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Scenario loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The simulation rejected an operation.
    #[error("simulation error: {source}")]
    Simulation {
        /// The contract violation.
        #[from]
        source: ContractError,
    },

    /// The report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
