//! The simulation context.
//!
//! [`Context`] is the single piece of kernel state every handler, manager,
//! actor, and plan receives. It owns the mutation handler table, the
//! observation subscription tables, the data managers, the plan queue, and
//! the clock. There are no globals: whoever holds `&mut Context` may act.
//!
//! # Mutation protocol
//!
//! 1. A public mutation method packages its arguments into a
//!    [`MutationEvent`] and calls [`Context::release_mutation`].
//! 2. The kernel looks up the one handler registered for that type and
//!    runs it immediately. Mutations released from inside a handler run to
//!    completion before the outer handler resumes (depth-first).
//! 3. The handler validates, writes, and then calls
//!    [`Context::subscribers_exist`] before building any
//!    [`ObservationEvent`], so unobserved changes cost nothing extra.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::rc::Rc;

use nucleus_types::{ContractError, ContractErrorKind};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::KernelConfig;
use crate::event::{MutationEvent, ObservationEvent};
use crate::label::{EventFilter, EventLabeler};
use crate::manager::{ComponentId, DataManager};
use crate::plan::{Plan, PlanQueue};
use crate::plugin::{PluginGraph, PluginId};
use crate::subscription::{ObservationHandler, Subscriptions};

/// Where a simulation is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LifecyclePhase {
    /// Plugins are registered but nothing has been initialized.
    Setup,
    /// Plugin initializers, manager `init`s, and actors are running.
    Initializing,
    /// Plans are executing.
    Running,
    /// Execution finished; the context is read-only.
    Closed,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// The handler consuming one mutation event type.
pub type MutationHandler<M> = Rc<dyn Fn(&mut Context, M) -> Result<(), ContractError>>;

type ActorInit = Box<dyn FnOnce(&mut Context, ComponentId) -> Result<(), ContractError>>;

type ManagerInit = fn(&mut Context, ComponentId, &mut dyn Any) -> Result<(), ContractError>;

struct ManagerSlot {
    instance: Option<Box<dyn Any>>,
    init: ManagerInit,
    plugin: PluginId,
    component: ComponentId,
    initialized: bool,
    type_name: &'static str,
}

struct PendingActor {
    plugin: PluginId,
    component: ComponentId,
    init: ActorInit,
}

fn init_manager<T: DataManager>(
    context: &mut Context,
    id: ComponentId,
    instance: &mut dyn Any,
) -> Result<(), ContractError> {
    instance
        .downcast_mut::<T>()
        .ok_or_else(|| {
            ContractError::with_details(ContractErrorKind::UnknownDataManager, type_name::<T>())
        })?
        .init(context, id)
}

/// Kernel state shared by every component of one simulation.
pub struct Context {
    phase: LifecyclePhase,
    time: f64,
    config: KernelConfig,
    mutation_handlers: HashMap<TypeId, Box<dyn Any>>,
    subscriptions: Subscriptions,
    managers: Vec<ManagerSlot>,
    manager_index: HashMap<TypeId, usize>,
    graph: Option<PluginGraph>,
    current_plugin: Option<PluginId>,
    pending_actors: Vec<PendingActor>,
    next_component: usize,
    plans: PlanQueue,
    halted: bool,
    mutations_released: u64,
    observations_released: u64,
}

impl Context {
    /// Create a context in the [`LifecyclePhase::Setup`] phase with the
    /// clock at `config.start_time`.
    pub fn new(config: KernelConfig) -> Self {
        Self {
            phase: LifecyclePhase::Setup,
            time: config.start_time,
            config,
            mutation_handlers: HashMap::new(),
            subscriptions: Subscriptions::default(),
            managers: Vec::new(),
            manager_index: HashMap::new(),
            graph: None,
            current_plugin: None,
            pending_actors: Vec::new(),
            next_component: 0,
            plans: PlanQueue::default(),
            halted: false,
            mutations_released: 0,
            observations_released: 0,
        }
    }

    /// The current lifecycle phase.
    pub const fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// The current simulation time.
    pub const fn current_time(&self) -> f64 {
        self.time
    }

    /// The kernel configuration.
    pub const fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// The plugin whose initializer, managers, or actors are initializing.
    pub const fn current_plugin(&self) -> Option<PluginId> {
        self.current_plugin
    }

    /// Number of mutation events released so far.
    pub const fn released_mutation_count(&self) -> u64 {
        self.mutations_released
    }

    /// Number of observation events released so far.
    ///
    /// Handlers only build observation events when subscribers exist, so
    /// this counts events that were actually constructed and dispatched.
    pub const fn released_observation_count(&self) -> u64 {
        self.observations_released
    }

    fn require_active(&self, operation: &str) -> Result<(), ContractError> {
        match self.phase {
            LifecyclePhase::Initializing | LifecyclePhase::Running => Ok(()),
            phase => Err(ContractError::with_details(
                ContractErrorKind::InvalidLifecyclePhase,
                format!("{operation} is not allowed during {phase}"),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Register the handler for mutation type `M`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMutationHandler` if `M` already has a handler.
    pub fn register_mutation_handler<M: MutationEvent>(
        &mut self,
        handler: impl Fn(&mut Self, M) -> Result<(), ContractError> + 'static,
    ) -> Result<(), ContractError> {
        match self.mutation_handlers.entry(TypeId::of::<M>()) {
            Entry::Occupied(_) => Err(ContractError::with_details(
                ContractErrorKind::DuplicateMutationHandler,
                type_name::<M>(),
            )),
            Entry::Vacant(slot) => {
                let handler: MutationHandler<M> = Rc::new(handler);
                slot.insert(Box::new(handler));
                Ok(())
            }
        }
    }

    /// Hand `mutation` to its handler and run it to completion.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLifecyclePhase` outside initialization and running,
    /// `UnknownMutationHandler` if no handler is registered for `M`, or
    /// whatever the handler returns.
    pub fn release_mutation<M: MutationEvent>(&mut self, mutation: M) -> Result<(), ContractError> {
        self.require_active("release_mutation")?;
        let handler = self
            .mutation_handlers
            .get(&TypeId::of::<M>())
            .and_then(|boxed| boxed.downcast_ref::<MutationHandler<M>>())
            .cloned()
            .ok_or_else(|| {
                ContractError::with_details(
                    ContractErrorKind::UnknownMutationHandler,
                    type_name::<M>(),
                )
            })?;
        self.mutations_released = self.mutations_released.saturating_add(1);
        if self.config.log_mutations {
            debug!(time = self.time, ?mutation, "Mutation released");
        } else {
            trace!(time = self.time, mutation = type_name::<M>(), "Mutation released");
        }
        handler(self, mutation)
    }

    // ------------------------------------------------------------------
    // Observations
    // ------------------------------------------------------------------

    /// Register a labeler for observation type `E`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateLabeler` if a labeler with the same id exists for `E`.
    pub fn add_event_labeler<E: ObservationEvent>(
        &mut self,
        labeler: EventLabeler<E>,
    ) -> Result<(), ContractError> {
        self.subscriptions
            .with_table::<E, _>(|table| table.add_labeler(labeler))
    }

    /// Subscribe `subscriber` to events of type `E` that pass `filter`.
    ///
    /// A subscriber holds one handler per event type: subscribing again
    /// with another filter adds the filter and replaces the handler. A
    /// subscriber matched by several of its filters is still invoked once.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLabeler` if `filter` is keyed on a labeler that is
    /// not registered for `E`. Nothing is registered in that case.
    pub fn subscribe<E: ObservationEvent>(
        &mut self,
        subscriber: ComponentId,
        filter: EventFilter<E>,
        handler: impl Fn(&mut Self, &E) -> Result<(), ContractError> + 'static,
    ) -> Result<(), ContractError> {
        if let Some(labeler_id) = filter.labeler_id() {
            let known = self
                .subscriptions
                .get::<E>()
                .is_some_and(|table| table.has_labeler(labeler_id));
            if !known {
                return Err(ContractError::with_details(
                    ContractErrorKind::UnknownLabeler,
                    format!("{labeler_id} for {}", type_name::<E>()),
                ));
            }
        }
        let handler: ObservationHandler<E> = Rc::new(handler);
        self.subscriptions
            .with_table::<E, _>(|table| table.subscribe(subscriber, &filter, handler));
        trace!(%subscriber, event = type_name::<E>(), "Subscribed");
        Ok(())
    }

    /// Remove one filter from `subscriber`.
    ///
    /// Returns `false` if the subscriber did not hold that filter. When the
    /// last filter goes, the handler goes with it.
    pub fn unsubscribe<E: ObservationEvent>(
        &mut self,
        subscriber: ComponentId,
        filter: &EventFilter<E>,
    ) -> bool {
        self.subscriptions
            .with_table::<E, _>(|table| table.unsubscribe(subscriber, filter))
    }

    /// Whether anyone is subscribed to `E` with any filter.
    pub fn subscribers_exist<E: ObservationEvent>(&self) -> bool {
        self.subscriptions
            .get::<E>()
            .is_some_and(|table| table.has_subscribers())
    }

    /// Dispatch `event` to every matching subscriber, once each, in
    /// ascending subscriber order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLifecyclePhase` outside initialization and running,
    /// or the first error a subscriber returns.
    pub fn release_observation<E: ObservationEvent>(
        &mut self,
        event: E,
    ) -> Result<(), ContractError> {
        self.require_active("release_observation")?;
        let handlers = self
            .subscriptions
            .get::<E>()
            .map(|table| table.matching(self, &event))
            .unwrap_or_default();
        self.observations_released = self.observations_released.saturating_add(1);
        trace!(
            time = self.time,
            event = type_name::<E>(),
            subscribers = handlers.len(),
            "Observation released"
        );
        for handler in handlers {
            handler(self, &event)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Data managers
    // ------------------------------------------------------------------

    fn manager_position<T: 'static>(&self) -> Result<usize, ContractError> {
        let name = type_name::<T>();
        let Some(&position) = self.manager_index.get(&TypeId::of::<T>()) else {
            let kind = if self.phase == LifecyclePhase::Initializing {
                ContractErrorKind::DataManagerNotInitialized
            } else {
                ContractErrorKind::UnknownDataManager
            };
            return Err(ContractError::with_details(kind, name));
        };
        let Some(slot) = self.managers.get(position) else {
            return Err(ContractError::with_details(
                ContractErrorKind::UnknownDataManager,
                name,
            ));
        };
        if !slot.initialized || slot.instance.is_none() {
            return Err(ContractError::with_details(
                ContractErrorKind::DataManagerNotInitialized,
                name,
            ));
        }
        if self.phase == LifecyclePhase::Initializing
            && let Some(current) = self.current_plugin
            && !self.plugin_can_access(current, slot.plugin)
        {
            return Err(ContractError::with_details(
                ContractErrorKind::DataManagerAccessViolation,
                format!("{current} cannot access {name} owned by {}", slot.plugin),
            ));
        }
        Ok(position)
    }

    fn plugin_can_access(&self, plugin: PluginId, owner: PluginId) -> bool {
        self.graph
            .as_ref()
            .is_none_or(|graph| graph.can_access(plugin, owner))
    }

    /// Borrow the data manager of type `T`.
    ///
    /// # Errors
    ///
    /// - `DataManagerNotInitialized` if `T` has not finished `init` (or,
    ///   during initialization, has not been added yet).
    /// - `DataManagerAccessViolation` if, during initialization, `T` belongs
    ///   to a plugin the current plugin does not depend on.
    /// - `UnknownDataManager` if no plugin added a `T`.
    pub fn data_manager<T: DataManager>(&self) -> Result<&T, ContractError> {
        let position = self.manager_position::<T>()?;
        self.managers
            .get(position)
            .and_then(|slot| slot.instance.as_deref())
            .and_then(|instance| instance.downcast_ref::<T>())
            .ok_or_else(|| {
                ContractError::with_details(ContractErrorKind::UnknownDataManager, type_name::<T>())
            })
    }

    /// Mutably borrow the data manager of type `T`.
    ///
    /// Intended for the manager's own mutation handlers.
    ///
    /// # Errors
    ///
    /// As [`Context::data_manager`].
    pub fn data_manager_mut<T: DataManager>(&mut self) -> Result<&mut T, ContractError> {
        let position = self.manager_position::<T>()?;
        self.managers
            .get_mut(position)
            .and_then(|slot| slot.instance.as_deref_mut())
            .and_then(|instance| instance.downcast_mut::<T>())
            .ok_or_else(|| {
                ContractError::with_details(ContractErrorKind::UnknownDataManager, type_name::<T>())
            })
    }

    fn allocate_component(&mut self) -> ComponentId {
        let id = ComponentId::new(self.next_component);
        self.next_component = self.next_component.saturating_add(1);
        id
    }

    pub(crate) fn add_data_manager<T: DataManager>(
        &mut self,
        plugin: PluginId,
        manager: T,
    ) -> Result<ComponentId, ContractError> {
        if self.phase != LifecyclePhase::Initializing {
            return Err(ContractError::with_details(
                ContractErrorKind::InvalidLifecyclePhase,
                format!("data managers can only be added while initializing, not {}", self.phase),
            ));
        }
        if self.manager_index.contains_key(&TypeId::of::<T>()) {
            return Err(ContractError::with_details(
                ContractErrorKind::DuplicateDataManager,
                type_name::<T>(),
            ));
        }
        let component = self.allocate_component();
        self.manager_index
            .insert(TypeId::of::<T>(), self.managers.len());
        self.managers.push(ManagerSlot {
            instance: Some(Box::new(manager)),
            init: init_manager::<T>,
            plugin,
            component,
            initialized: false,
            type_name: type_name::<T>(),
        });
        Ok(component)
    }

    pub(crate) fn add_actor(
        &mut self,
        plugin: PluginId,
        actor: impl FnOnce(&mut Self, ComponentId) -> Result<(), ContractError> + 'static,
    ) -> ComponentId {
        let component = self.allocate_component();
        self.pending_actors.push(PendingActor {
            plugin,
            component,
            init: Box::new(actor),
        });
        component
    }

    /// Run `init` for every manager `plugin` added, in the order added.
    pub(crate) fn initialize_managers(&mut self, plugin: PluginId) -> Result<(), ContractError> {
        let pending: Vec<usize> = self
            .managers
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.plugin == plugin && !slot.initialized)
            .map(|(position, _)| position)
            .collect();
        for position in pending {
            let Some(slot) = self.managers.get_mut(position) else {
                continue;
            };
            let Some(mut instance) = slot.instance.take() else {
                continue;
            };
            let (init, component, name) = (slot.init, slot.component, slot.type_name);
            let result = init(self, component, &mut *instance);
            if let Some(slot) = self.managers.get_mut(position) {
                slot.instance = Some(instance);
                slot.initialized = result.is_ok();
            }
            result?;
            debug!(%plugin, %component, manager = name, "Data manager initialized");
        }
        Ok(())
    }

    /// Initialize every pending actor in the order they were added.
    pub(crate) fn initialize_actors(&mut self) -> Result<(), ContractError> {
        for actor in std::mem::take(&mut self.pending_actors) {
            self.current_plugin = Some(actor.plugin);
            (actor.init)(self, actor.component)?;
            debug!(plugin = %actor.plugin, component = %actor.component, "Actor initialized");
        }
        Ok(())
    }

    pub(crate) fn set_graph(&mut self, graph: PluginGraph) {
        self.graph = Some(graph);
    }

    pub(crate) const fn set_current_plugin(&mut self, plugin: Option<PluginId>) {
        self.current_plugin = plugin;
    }

    pub(crate) fn set_phase(&mut self, phase: LifecyclePhase) {
        debug!(from = %self.phase, to = %phase, "Lifecycle phase changed");
        self.phase = phase;
    }

    // ------------------------------------------------------------------
    // Plans and the clock
    // ------------------------------------------------------------------

    /// Schedule `plan` to run at `time`.
    ///
    /// Plans at the same time run in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `PastPlanningTime` if `time` is before the current time or
    /// not finite, or `InvalidLifecyclePhase` once the simulation closed.
    pub fn add_plan(
        &mut self,
        time: f64,
        plan: impl FnOnce(&mut Self) -> Result<(), ContractError> + 'static,
    ) -> Result<(), ContractError> {
        if self.phase == LifecyclePhase::Closed {
            return Err(ContractError::with_details(
                ContractErrorKind::InvalidLifecyclePhase,
                "cannot plan after the simulation closed",
            ));
        }
        if !time.is_finite() || time < self.time {
            return Err(ContractError::with_details(
                ContractErrorKind::PastPlanningTime,
                format!("planned for {time}, current time is {}", self.time),
            ));
        }
        let plan: Plan = Box::new(plan);
        self.plans.push(time, plan);
        Ok(())
    }

    /// Number of plans waiting to run.
    pub fn pending_plan_count(&self) -> usize {
        self.plans.len()
    }

    /// Stop execution after the current plan returns.
    pub fn halt(&mut self) {
        if !self.halted {
            debug!(time = self.time, "Halt requested");
        }
        self.halted = true;
    }

    /// Whether [`Context::halt`] has been called.
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn next_plan_time(&self) -> Option<f64> {
        self.plans.peek_time()
    }

    /// Pop the next plan and advance the clock to its time.
    pub(crate) fn take_next_plan(&mut self) -> Option<Plan> {
        let (time, plan) = self.plans.pop()?;
        self.time = self.time.max(time);
        Some(plan)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("phase", &self.phase)
            .field("time", &self.time)
            .field("managers", &self.managers.len())
            .field("pending_plans", &self.plans.len())
            .field("halted", &self.halted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::label::{LabelValue, LabelerId};

    #[derive(Debug)]
    struct Bump(i64);
    impl MutationEvent for Bump {}

    #[derive(Debug)]
    struct Chain(u32);
    impl MutationEvent for Chain {}

    #[derive(Debug)]
    struct Bumped {
        amount: i64,
    }
    impl ObservationEvent for Bumped {}

    const SIGN: LabelerId = LabelerId::new("sign");

    fn sign(_context: &Context, event: &Bumped) -> Vec<LabelValue> {
        vec![LabelValue::Bool(event.amount >= 0)]
    }

    fn running() -> Context {
        let mut context = Context::new(KernelConfig::default());
        context.phase = LifecyclePhase::Running;
        context
    }

    fn bump_handler(context: &mut Context, bump: Bump) -> Result<(), ContractError> {
        if context.subscribers_exist::<Bumped>() {
            context.release_observation(Bumped { amount: bump.0 })?;
        }
        Ok(())
    }

    #[test]
    fn duplicate_and_missing_mutation_handlers() {
        let mut context = running();
        context.register_mutation_handler(bump_handler).unwrap();
        let err = context.register_mutation_handler(bump_handler).unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::DuplicateMutationHandler);

        let err = context.release_mutation(Chain(0)).unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::UnknownMutationHandler);
    }

    #[test]
    fn mutations_rejected_outside_active_phases() {
        let mut context = Context::new(KernelConfig::default());
        context.register_mutation_handler(bump_handler).unwrap();
        let err = context.release_mutation(Bump(1)).unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::InvalidLifecyclePhase);
    }

    #[test]
    fn no_observation_without_subscribers() {
        let mut context = running();
        context.register_mutation_handler(bump_handler).unwrap();
        context.release_mutation(Bump(3)).unwrap();
        assert_eq!(context.released_mutation_count(), 1);
        assert_eq!(context.released_observation_count(), 0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        context
            .subscribe(ComponentId::new(0), EventFilter::all(), move |_ctx, e: &Bumped| {
                sink.borrow_mut().push(e.amount);
                Ok(())
            })
            .unwrap();
        context.release_mutation(Bump(4)).unwrap();
        assert_eq!(context.released_observation_count(), 1);
        assert_eq!(*seen.borrow(), vec![4]);
    }

    #[test]
    fn nested_mutations_run_depth_first() {
        let mut context = running();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        context
            .register_mutation_handler(move |ctx: &mut Context, chain: Chain| {
                sink.borrow_mut().push(format!("enter {}", chain.0));
                if chain.0 < 2 {
                    ctx.release_mutation(Chain(chain.0 + 1))?;
                }
                sink.borrow_mut().push(format!("exit {}", chain.0));
                Ok(())
            })
            .unwrap();
        context.release_mutation(Chain(0)).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["enter 0", "enter 1", "enter 2", "exit 2", "exit 1", "exit 0"]
        );
    }

    #[test]
    fn keyed_filters_route_and_dedupe() {
        let mut context = running();
        context.register_mutation_handler(bump_handler).unwrap();
        context
            .add_event_labeler(EventLabeler::new(SIGN, sign))
            .unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        let positive = EventFilter::<Bumped>::keyed(SIGN, vec![LabelValue::Bool(true)]);
        for (id, filter) in [
            (5, positive.clone()),
            (2, EventFilter::all()),
            (5, EventFilter::all()),
        ] {
            let sink = Rc::clone(&log);
            context
                .subscribe(ComponentId::new(id), filter, move |_ctx, e: &Bumped| {
                    sink.borrow_mut().push((id, e.amount));
                    Ok(())
                })
                .unwrap();
        }

        context.release_mutation(Bump(7)).unwrap();
        context.release_mutation(Bump(-1)).unwrap();
        assert_eq!(*log.borrow(), vec![(2, 7), (5, 7), (2, -1), (5, -1)]);

        log.borrow_mut().clear();
        assert!(context.unsubscribe(ComponentId::new(5), &EventFilter::<Bumped>::all()));
        context.release_mutation(Bump(-2)).unwrap();
        context.release_mutation(Bump(2)).unwrap();
        assert_eq!(*log.borrow(), vec![(2, -2), (2, 2), (5, 2)]);
    }

    #[test]
    fn unknown_labeler_rejected_before_registration() {
        let mut context = running();
        let filter = EventFilter::<Bumped>::keyed(SIGN, vec![LabelValue::Bool(true)]);
        let err = context
            .subscribe(ComponentId::new(0), filter, |_ctx, _e: &Bumped| Ok(()))
            .unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::UnknownLabeler);
        assert!(!context.subscribers_exist::<Bumped>());

        context
            .add_event_labeler(EventLabeler::new(SIGN, sign))
            .unwrap();
        let err = context
            .add_event_labeler(EventLabeler::new(SIGN, sign))
            .unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::DuplicateLabeler);
    }

    #[test]
    fn plans_reject_past_and_non_finite_times() {
        let mut context = running();
        context.time = 10.0;
        let err = context.add_plan(9.5, |_ctx| Ok(())).unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::PastPlanningTime);
        let err = context.add_plan(f64::NAN, |_ctx| Ok(())).unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::PastPlanningTime);
        context.add_plan(10.0, |_ctx| Ok(())).unwrap();
        assert_eq!(context.pending_plan_count(), 1);
    }

    #[test]
    fn unknown_manager_outside_initialization() {
        #[derive(Debug)]
        struct Missing;
        impl DataManager for Missing {
            fn init(
                &mut self,
                _context: &mut Context,
                _id: ComponentId,
            ) -> Result<(), ContractError> {
                Ok(())
            }
        }
        let context = running();
        let err = context.data_manager::<Missing>().unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::UnknownDataManager);
    }
}
