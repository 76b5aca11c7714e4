//! Assemble and run a scenario.
//!
//! The simulation is the people and regions plugins plus a `report`
//! plugin. The report plugin's actor counts region moves by arrival region
//! and schedules every configured move as a plan.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use nucleus_core::{
    Context, ContractError, EventFilter, Plugin, PluginId, Simulation, SimulationBuilder,
};
use nucleus_people::people_plugin;
use nucleus_regions::{
    ContextRegionsExt, PersonRegionUpdateEvent, REGIONS_PLUGIN_ID, regions_plugin,
};
use nucleus_types::RegionId;
use tracing::{info, warn};

use crate::config::{PlannedMove, ScenarioConfig};
use crate::error::EngineError;
use crate::report::ScenarioReport;

/// Id of the reporting plugin.
pub const REPORT_PLUGIN_ID: PluginId = PluginId::new("report");

/// Arrivals per region, shared between the report actor and the caller.
pub type ArrivalTally = Rc<RefCell<BTreeMap<RegionId, u64>>>;

/// Build the scenario's simulation.
///
/// # Errors
///
/// Returns the plugin graph error if the plugins cannot be ordered.
pub fn build(config: &ScenarioConfig) -> Result<(Simulation, ArrivalTally), ContractError> {
    let tally = ArrivalTally::default();
    let simulation = SimulationBuilder::new()
        .config(config.kernel.clone())
        .add_plugin(people_plugin(config.people.clone()))
        .add_plugin(regions_plugin(config.regions.clone()))
        .add_plugin(report_plugin(config.moves.clone(), Rc::clone(&tally)))
        .build()?;
    Ok((simulation, tally))
}

fn report_plugin(moves: Vec<PlannedMove>, tally: ArrivalTally) -> Plugin {
    Plugin::builder(REPORT_PLUGIN_ID)
        .dependency(REGIONS_PLUGIN_ID)
        .initializer(move |plugin| {
            plugin.add_actor(move |context, id| {
                context.subscribe(
                    id,
                    EventFilter::all(),
                    move |_context, event: &PersonRegionUpdateEvent| {
                        let mut arrivals = tally.borrow_mut();
                        let count = arrivals.entry(event.current_region).or_default();
                        *count = count.saturating_add(1);
                        Ok(())
                    },
                )?;
                for planned in moves {
                    context.add_plan(planned.time, move |context| {
                        apply_move(context, planned)
                    })?;
                }
                Ok(())
            });
            Ok(())
        })
        .build()
}

/// A move naming a person who no longer exists is skipped, not fatal.
fn apply_move(context: &mut Context, planned: PlannedMove) -> Result<(), ContractError> {
    match context.set_person_region(planned.person, planned.region) {
        Err(err) if !err.is_fatal() => {
            warn!(person = %planned.person, region = %planned.region, %err, "Planned move skipped");
            Ok(())
        }
        other => other,
    }
}

/// Initialize, execute, and report on a scenario.
///
/// # Errors
///
/// Returns [`EngineError::Simulation`] if the simulation fails to build,
/// initialize, or run.
pub fn run(config: &ScenarioConfig) -> Result<ScenarioReport, EngineError> {
    let (mut simulation, tally) = build(config)?;
    info!(plugins = ?simulation.plugin_order(), "Plugins resolved");
    simulation.initialize()?;
    let summary = simulation.execute()?;
    info!(
        final_time = summary.final_time,
        plans_executed = summary.plans_executed,
        halted = summary.halted,
        "Execution finished"
    );
    let arrivals = tally.borrow().clone();
    let report = ScenarioReport::collect(&simulation, summary, arrivals)?;
    Ok(report)
}
