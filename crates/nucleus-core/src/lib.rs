//! Simulation kernel for Nucleus.
//!
//! This crate wires together the pieces every plugin builds on: the
//! mutation/observation event protocol, label-routed subscriptions, the
//! plugin dependency graph, data managers, and the plan-driven clock.
//!
//! # Modules
//!
//! - [`config`] -- [`KernelConfig`] loaded from YAML
//! - [`context`] -- [`Context`], the state every handler and plan receives
//! - [`event`] -- [`MutationEvent`] and [`ObservationEvent`] marker traits
//! - [`label`] -- Labelers, labels, and filters for observation routing
//! - [`manager`] -- [`DataManager`] trait and [`ComponentId`]
//! - [`plugin`] -- [`Plugin`] descriptors and [`PluginGraph`] resolution
//! - [`simulation`] -- [`SimulationBuilder`], [`Simulation`], [`ExecutionSummary`]

pub mod config;
pub mod context;
pub mod event;
pub mod label;
pub mod manager;
mod plan;
pub mod plugin;
pub mod simulation;
mod subscription;

pub use config::{ConfigError, KernelConfig};
pub use context::{Context, LifecyclePhase, MutationHandler};
pub use event::{MutationEvent, ObservationEvent};
pub use label::{EventFilter, EventLabel, EventLabeler, LabelFn, LabelValue, LabelerId};
pub use manager::{ComponentId, DataManager};
pub use nucleus_types::{ContractError, ContractErrorKind};
pub use plan::Plan;
pub use plugin::{Plugin, PluginBuilder, PluginContext, PluginGraph, PluginId, PluginInitializer};
pub use simulation::{ExecutionSummary, Simulation, SimulationBuilder};
pub use subscription::ObservationHandler;
