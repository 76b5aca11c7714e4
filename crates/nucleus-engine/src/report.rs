//! The JSON report printed after a run.

use std::collections::BTreeMap;

use nucleus_core::{ContractError, ExecutionSummary, Simulation};
use nucleus_people::PeopleDataManager;
use nucleus_regions::{RegionsDataManager, RegionsPluginData};
use nucleus_types::RegionId;
use serde::Serialize;

/// Outcome of one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Clock and counters from execution.
    pub summary: ExecutionSummary,
    /// Total region moves observed.
    pub moves: u64,
    /// Moves observed per arrival region.
    pub arrivals: BTreeMap<RegionId, u64>,
    /// People alive at the end.
    pub population: usize,
    /// Final regions state, loadable as the `regions` section of a scenario.
    pub regions: RegionsPluginData,
}

impl ScenarioReport {
    /// Gather the report from a finished simulation.
    ///
    /// # Errors
    ///
    /// Fails if the people or regions manager is missing.
    pub fn collect(
        simulation: &Simulation,
        summary: ExecutionSummary,
        arrivals: BTreeMap<RegionId, u64>,
    ) -> Result<Self, ContractError> {
        let context = simulation.context();
        let population = context.data_manager::<PeopleDataManager>()?.population_count();
        let regions = context.data_manager::<RegionsDataManager>()?.to_plugin_data()?;
        let moves = arrivals.values().fold(0_u64, |total, n| total.saturating_add(*n));
        Ok(Self {
            summary,
            moves,
            arrivals,
            population,
            regions,
        })
    }
}
