//! Plugin descriptors and dependency resolution.
//!
//! A [`Plugin`] bundles an id, the ids of the plugins it depends on, and an
//! initializer that adds the plugin's data managers and actors.
//! [`PluginGraph::resolve`] orders plugins so every plugin initializes
//! after all of its dependencies, using Kahn's algorithm. When several
//! plugins are ready at once, the one registered first goes first, so the
//! order is deterministic for a given registration sequence.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use nucleus_types::{ContractError, ContractErrorKind};
use tracing::debug;

use crate::context::Context;
use crate::manager::{ComponentId, DataManager};

/// Unique name of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginId(&'static str);

impl PluginId {
    /// Create a plugin id from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The plugin's name.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Callback run once, in dependency order, to populate a plugin.
pub type PluginInitializer = Box<dyn FnOnce(&mut PluginContext<'_>) -> Result<(), ContractError>>;

/// A plugin: id, dependencies, and initializer.
pub struct Plugin {
    id: PluginId,
    dependencies: Vec<PluginId>,
    initializer: Option<PluginInitializer>,
}

impl Plugin {
    /// Start building a plugin with the given id.
    pub const fn builder(id: PluginId) -> PluginBuilder {
        PluginBuilder {
            id,
            dependencies: Vec::new(),
            initializer: None,
        }
    }

    /// The plugin's id.
    pub const fn id(&self) -> PluginId {
        self.id
    }

    /// The plugins this one depends on, as declared.
    pub fn dependencies(&self) -> &[PluginId] {
        &self.dependencies
    }

    pub(crate) fn take_initializer(&mut self) -> Option<PluginInitializer> {
        self.initializer.take()
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .field("has_initializer", &self.initializer.is_some())
            .finish()
    }
}

/// Builder for [`Plugin`].
pub struct PluginBuilder {
    id: PluginId,
    dependencies: Vec<PluginId>,
    initializer: Option<PluginInitializer>,
}

impl PluginBuilder {
    /// Declare a dependency. Repeats are ignored during resolution.
    #[must_use]
    pub fn dependency(mut self, id: PluginId) -> Self {
        self.dependencies.push(id);
        self
    }

    /// Set the initializer.
    #[must_use]
    pub fn initializer(
        mut self,
        initializer: impl FnOnce(&mut PluginContext<'_>) -> Result<(), ContractError> + 'static,
    ) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    /// Finish the plugin.
    pub fn build(self) -> Plugin {
        Plugin {
            id: self.id,
            dependencies: self.dependencies,
            initializer: self.initializer,
        }
    }
}

/// The handle a plugin initializer uses to populate the simulation.
pub struct PluginContext<'a> {
    context: &'a mut Context,
    plugin: PluginId,
}

impl<'a> PluginContext<'a> {
    pub(crate) const fn new(context: &'a mut Context, plugin: PluginId) -> Self {
        Self { context, plugin }
    }

    /// The plugin being initialized.
    pub const fn plugin_id(&self) -> PluginId {
        self.plugin
    }

    /// Read-only view of the simulation context.
    pub const fn context(&self) -> &Context {
        &*self.context
    }

    /// Add a data manager owned by this plugin.
    ///
    /// The manager's `init` runs after this plugin's initializer returns.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateDataManager` if a manager of the same type exists.
    pub fn add_data_manager<T: DataManager>(
        &mut self,
        manager: T,
    ) -> Result<ComponentId, ContractError> {
        self.context.add_data_manager(self.plugin, manager)
    }

    /// Add an actor, initialized after every data manager in the simulation.
    pub fn add_actor(
        &mut self,
        actor: impl FnOnce(&mut Context, ComponentId) -> Result<(), ContractError> + 'static,
    ) -> ComponentId {
        self.context.add_actor(self.plugin, actor)
    }
}

/// A resolved plugin graph: a total initialization order plus the
/// transitive dependency set of every plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginGraph {
    positions: Vec<usize>,
    order: Vec<PluginId>,
    closures: BTreeMap<PluginId, BTreeSet<PluginId>>,
}

impl PluginGraph {
    /// Order `plugins` so that dependencies come first.
    ///
    /// # Errors
    ///
    /// - `DuplicatePluginId` if two plugins share an id.
    /// - `UnknownPluginDependency` if a dependency names no plugin.
    /// - `CircularPluginDependency` if the graph has a cycle; the details
    ///   list every plugin that could not be ordered.
    pub fn resolve(plugins: &[Plugin]) -> Result<Self, ContractError> {
        let mut index_of: IndexMap<PluginId, usize> = IndexMap::new();
        for (i, plugin) in plugins.iter().enumerate() {
            if index_of.insert(plugin.id, i).is_some() {
                return Err(ContractError::with_details(
                    ContractErrorKind::DuplicatePluginId,
                    plugin.id,
                ));
            }
        }

        let mut in_degree = vec![0_usize; plugins.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); plugins.len()];
        for (i, plugin) in plugins.iter().enumerate() {
            let mut seen: IndexSet<PluginId> = IndexSet::new();
            for dependency in &plugin.dependencies {
                let Some(&j) = index_of.get(dependency) else {
                    return Err(ContractError::with_details(
                        ContractErrorKind::UnknownPluginDependency,
                        format!("{} depends on {dependency}", plugin.id),
                    ));
                };
                if !seen.insert(*dependency) {
                    continue;
                }
                if let Some(degree) = in_degree.get_mut(i) {
                    *degree = degree.saturating_add(1);
                }
                if let Some(list) = dependents.get_mut(j) {
                    list.push(i);
                }
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(i, _)| i)
            .collect();
        let mut positions = Vec::with_capacity(plugins.len());
        while let Some(i) = ready.pop_first() {
            positions.push(i);
            for &k in dependents.get(i).map_or(&[][..], Vec::as_slice) {
                if let Some(degree) = in_degree.get_mut(k) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.insert(k);
                    }
                }
            }
        }

        if positions.len() != plugins.len() {
            let involved: Vec<&str> = plugins
                .iter()
                .zip(&in_degree)
                .filter(|&(_, &degree)| degree > 0)
                .map(|(plugin, _)| plugin.id.name())
                .collect();
            return Err(ContractError::with_details(
                ContractErrorKind::CircularPluginDependency,
                involved.join(", "),
            ));
        }

        let order: Vec<PluginId> = positions
            .iter()
            .filter_map(|&i| plugins.get(i).map(|p| p.id))
            .collect();

        let mut closures: BTreeMap<PluginId, BTreeSet<PluginId>> = BTreeMap::new();
        for &i in &positions {
            let Some(plugin) = plugins.get(i) else {
                continue;
            };
            let mut closure = BTreeSet::new();
            for dependency in &plugin.dependencies {
                closure.insert(*dependency);
                if let Some(inherited) = closures.get(dependency) {
                    closure.extend(inherited.iter().copied());
                }
            }
            closures.insert(plugin.id, closure);
        }

        debug!(order = ?order, "Plugin graph resolved");
        Ok(Self {
            positions,
            order,
            closures,
        })
    }

    /// Plugin ids in initialization order.
    pub fn order(&self) -> &[PluginId] {
        &self.order
    }

    /// Registration indices in initialization order.
    pub(crate) fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Every plugin `plugin` depends on, directly or transitively.
    pub fn dependencies_of(&self, plugin: PluginId) -> Option<&BTreeSet<PluginId>> {
        self.closures.get(&plugin)
    }

    /// Whether `plugin` may see state owned by `owner`.
    pub fn can_access(&self, plugin: PluginId, owner: PluginId) -> bool {
        plugin == owner
            || self
                .closures
                .get(&plugin)
                .is_some_and(|closure| closure.contains(&owner))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const A: PluginId = PluginId::new("A");
    const B: PluginId = PluginId::new("B");
    const C: PluginId = PluginId::new("C");

    fn plugin(id: PluginId, deps: &[PluginId]) -> Plugin {
        deps.iter()
            .fold(Plugin::builder(id), |builder, &dep| builder.dependency(dep))
            .build()
    }

    #[test]
    fn chain_orders_dependencies_first_for_any_registration_order() {
        let registrations = [
            vec![plugin(A, &[]), plugin(B, &[A]), plugin(C, &[A, B])],
            vec![plugin(C, &[A, B]), plugin(B, &[A]), plugin(A, &[])],
            vec![plugin(B, &[A]), plugin(C, &[A, B]), plugin(A, &[])],
            vec![plugin(C, &[A, B]), plugin(A, &[]), plugin(B, &[A])],
        ];
        for plugins in registrations {
            let graph = PluginGraph::resolve(&plugins).unwrap();
            assert_eq!(graph.order(), &[A, B, C]);
        }
    }

    #[test]
    fn ties_break_by_registration_order() {
        let plugins = vec![plugin(C, &[]), plugin(A, &[]), plugin(B, &[C])];
        let graph = PluginGraph::resolve(&plugins).unwrap();
        assert_eq!(graph.order(), &[C, A, B]);
        assert_eq!(graph.positions(), &[0, 1, 2]);
    }

    #[test]
    fn closure_is_transitive() {
        let plugins = vec![plugin(A, &[]), plugin(B, &[A, A]), plugin(C, &[B])];
        let graph = PluginGraph::resolve(&plugins).unwrap();
        let closure = graph.dependencies_of(C).unwrap();
        assert!(closure.contains(&A) && closure.contains(&B));
        assert!(graph.can_access(C, A));
        assert!(graph.can_access(B, B));
        assert!(!graph.can_access(A, C));
    }

    #[test]
    fn cycle_is_reported_with_members() {
        let plugins = vec![plugin(A, &[C]), plugin(B, &[A]), plugin(C, &[B])];
        let err = PluginGraph::resolve(&plugins).unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::CircularPluginDependency);
        assert_eq!(err.details(), Some("A, B, C"));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let err = PluginGraph::resolve(&[plugin(A, &[A])]).unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::CircularPluginDependency);
    }

    #[test]
    fn unknown_and_duplicate_ids() {
        let err = PluginGraph::resolve(&[plugin(A, &[B])]).unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::UnknownPluginDependency);

        let err = PluginGraph::resolve(&[plugin(A, &[]), plugin(A, &[])]).unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::DuplicatePluginId);
    }
}
