//! Kernel configuration loaded from YAML.
//!
//! The kernel only needs a handful of settings: where the clock starts,
//! an optional time bound for plan execution, and whether mutations are
//! logged at `debug` instead of `trace`. Scenario files embed this struct
//! under a `kernel:` key.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible run.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Settings for the simulation clock and kernel diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Simulation time at which the clock starts.
    #[serde(default = "default_start_time")]
    pub start_time: f64,

    /// Plans scheduled after this time are never executed.
    #[serde(default)]
    pub stop_time: Option<f64>,

    /// Log every released mutation at `debug` level.
    #[serde(default)]
    pub log_mutations: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            stop_time: None,
            log_mutations: false,
        }
    }
}

impl KernelConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the times are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the times are inconsistent.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the start and stop times describe a runnable clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `start_time` is not finite or
    /// `stop_time` lies before it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.start_time.is_finite() {
            return Err(ConfigError::Invalid {
                reason: format!("start_time must be finite, got {}", self.start_time),
            });
        }
        if let Some(stop) = self.stop_time
            && (stop.is_nan() || stop < self.start_time)
        {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "stop_time {stop} precedes start_time {}",
                    self.start_time
                ),
            });
        }
        Ok(())
    }
}

const fn default_start_time() -> f64 {
    0.0
}
