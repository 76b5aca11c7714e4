//! Scenario configuration loaded from YAML.
//!
//! A scenario file bundles the kernel settings, logging settings, the
//! starting data for the people and regions plugins, and a list of person
//! moves to plan. Every section is optional.

use std::path::Path;

use nucleus_core::{ConfigError, KernelConfig};
use nucleus_people::PeoplePluginData;
use nucleus_regions::RegionsPluginData;
use nucleus_types::{PersonId, RegionId};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "NUCLEUS_LOG_LEVEL";

/// Everything needed to run one scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Clock and kernel diagnostics.
    #[serde(default)]
    pub kernel: KernelConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Starting population.
    #[serde(default)]
    pub people: PeoplePluginData,

    /// Starting regions and placements.
    #[serde(default)]
    pub regions: RegionsPluginData,

    /// Person moves to schedule before execution.
    #[serde(default)]
    pub moves: Vec<PlannedMove>,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_owned()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// The level to use, preferring `override_level` when it is set and
    /// non-empty.
    pub fn resolve_level(&self, override_level: Option<String>) -> String {
        override_level
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| self.level.clone())
    }
}

/// Move `person` to `region` at simulation time `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedMove {
    /// When the move happens.
    pub time: f64,
    /// Who moves.
    pub person: PersonId,
    /// Where to.
    pub region: RegionId,
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the scenario is inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// As [`ScenarioConfig::from_file`], minus I/O.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the kernel times, the plugin data, and every planned move.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.kernel.validate()?;
        self.people.validate().map_err(|err| ConfigError::Invalid {
            reason: format!("people: {err}"),
        })?;
        self.regions.validate().map_err(|err| ConfigError::Invalid {
            reason: format!("regions: {err}"),
        })?;
        for planned in &self.moves {
            if !planned.time.is_finite() || planned.time < self.kernel.start_time {
                return Err(ConfigError::Invalid {
                    reason: format!(
                        "move of {} at {} precedes start_time {}",
                        planned.person, planned.time, self.kernel.start_time
                    ),
                });
            }
            if !self.regions.regions().contains(&planned.region) {
                return Err(ConfigError::Invalid {
                    reason: format!(
                        "move of {} targets unknown {}",
                        planned.person, planned.region
                    ),
                });
            }
        }
        Ok(())
    }
}
