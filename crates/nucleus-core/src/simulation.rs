//! Building, initializing, and running a simulation.
//!
//! ```text
//! SimulationBuilder::add_plugin ... build()   -> resolve plugin graph
//! Simulation::initialize()                    -> for each plugin in order:
//!                                                  run initializer
//!                                                  init its data managers
//!                                                then init every actor
//! Simulation::execute()                       -> run plans in time order
//! ```
//!
//! The plugin graph is resolved in [`SimulationBuilder::build`], so a
//! missing dependency or a cycle is reported before any initializer runs.

use nucleus_types::{ContractError, ContractErrorKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::KernelConfig;
use crate::context::{Context, LifecyclePhase};
use crate::plugin::{Plugin, PluginContext, PluginGraph, PluginId};

/// What a finished [`Simulation::execute`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExecutionSummary {
    /// Simulation time when execution stopped.
    pub final_time: f64,
    /// Number of plans run.
    pub plans_executed: u64,
    /// Plans still queued when execution stopped.
    pub plans_remaining: usize,
    /// Mutation events released over the whole run, including initialization.
    pub mutations_released: u64,
    /// Observation events released over the whole run, including initialization.
    pub observations_released: u64,
    /// Whether execution stopped because of [`Context::halt`].
    pub halted: bool,
}

/// Collects configuration and plugins for a [`Simulation`].
#[derive(Debug, Default)]
pub struct SimulationBuilder {
    config: KernelConfig,
    plugins: Vec<Plugin>,
}

impl SimulationBuilder {
    /// Start with the default kernel configuration and no plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the kernel configuration.
    #[must_use]
    pub fn config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a plugin. Registration order only matters to break ties
    /// between plugins with no ordering constraint between them.
    #[must_use]
    pub fn add_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Resolve the plugin graph and produce an uninitialized simulation.
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePluginId`, `UnknownPluginDependency`, or
    /// `CircularPluginDependency` from [`PluginGraph::resolve`].
    pub fn build(self) -> Result<Simulation, ContractError> {
        let graph = PluginGraph::resolve(&self.plugins)?;
        let mut slots: Vec<Option<Plugin>> = self.plugins.into_iter().map(Some).collect();
        let plugins: Vec<Plugin> = graph
            .positions()
            .iter()
            .filter_map(|&position| slots.get_mut(position).and_then(Option::take))
            .collect();
        let order = graph.order().to_vec();
        info!(plugins = plugins.len(), order = ?order, "Simulation built");

        let mut context = Context::new(self.config);
        context.set_graph(graph);
        Ok(Simulation {
            context,
            plugins,
            order,
            plans_executed: 0,
        })
    }
}

/// A simulation: its context plus the plugins waiting to initialize.
#[derive(Debug)]
pub struct Simulation {
    context: Context,
    plugins: Vec<Plugin>,
    order: Vec<PluginId>,
    plans_executed: u64,
}

impl Simulation {
    /// Plugin ids in initialization order.
    pub fn plugin_order(&self) -> &[PluginId] {
        &self.order
    }

    /// The simulation context.
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// The simulation context, mutably. Useful for scheduling plans between
    /// [`Simulation::initialize`] and [`Simulation::execute`].
    pub const fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Initialize every plugin, data manager, and actor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLifecyclePhase` if called twice, or the first error
    /// raised by an initializer, manager, or actor.
    pub fn initialize(&mut self) -> Result<(), ContractError> {
        if self.context.phase() != LifecyclePhase::Setup {
            return Err(ContractError::with_details(
                ContractErrorKind::InvalidLifecyclePhase,
                format!("initialize called during {}", self.context.phase()),
            ));
        }
        self.context.set_phase(LifecyclePhase::Initializing);

        for mut plugin in std::mem::take(&mut self.plugins) {
            let id = plugin.id();
            self.context.set_current_plugin(Some(id));
            if let Some(initializer) = plugin.take_initializer() {
                let mut plugin_context = PluginContext::new(&mut self.context, id);
                initializer(&mut plugin_context)?;
            }
            self.context.initialize_managers(id)?;
            debug!(plugin = %id, "Plugin initialized");
        }
        self.context.initialize_actors()?;
        self.context.set_current_plugin(None);

        self.context.set_phase(LifecyclePhase::Running);
        info!(
            time = self.context.current_time(),
            plans = self.context.pending_plan_count(),
            "Simulation initialized"
        );
        Ok(())
    }

    /// Run plans in time order until the queue empties, a plan halts the
    /// simulation, or the next plan lies beyond the configured stop time.
    /// Initializes first if [`Simulation::initialize`] was not called.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLifecyclePhase` once closed, or the first error
    /// raised during initialization or by a plan. The simulation closes on
    /// error.
    pub fn execute(&mut self) -> Result<ExecutionSummary, ContractError> {
        match self.context.phase() {
            LifecyclePhase::Setup => self.initialize()?,
            LifecyclePhase::Running => {}
            phase => {
                return Err(ContractError::with_details(
                    ContractErrorKind::InvalidLifecyclePhase,
                    format!("execute called during {phase}"),
                ));
            }
        }

        let result = self.run_plans();
        self.context.set_phase(LifecyclePhase::Closed);
        result?;

        let summary = self.summary();
        info!(
            final_time = summary.final_time,
            plans = summary.plans_executed,
            mutations = summary.mutations_released,
            observations = summary.observations_released,
            halted = summary.halted,
            "Simulation finished"
        );
        Ok(summary)
    }

    fn run_plans(&mut self) -> Result<(), ContractError> {
        let stop_time = self.context.config().stop_time;
        while !self.context.is_halted() {
            let Some(next_time) = self.context.next_plan_time() else {
                break;
            };
            if stop_time.is_some_and(|stop| next_time > stop) {
                debug!(next_time, ?stop_time, "Stop time reached");
                break;
            }
            let Some(plan) = self.context.take_next_plan() else {
                break;
            };
            plan(&mut self.context)?;
            self.plans_executed = self.plans_executed.saturating_add(1);
        }
        Ok(())
    }

    /// Counters for the run so far.
    pub fn summary(&self) -> ExecutionSummary {
        ExecutionSummary {
            final_time: self.context.current_time(),
            plans_executed: self.plans_executed,
            plans_remaining: self.context.pending_plan_count(),
            mutations_released: self.context.released_mutation_count(),
            observations_released: self.context.released_observation_count(),
            halted: self.context.is_halted(),
        }
    }
}
