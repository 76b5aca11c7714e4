//! Data managers and component identity.

use std::any::Any;
use std::fmt;

use nucleus_types::ContractError;

use crate::context::Context;

/// Identifies a data manager or actor within one simulation.
///
/// Ids are handed out in creation order. Subscribers are invoked in
/// ascending id order, which makes dispatch order deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(usize);

impl ComponentId {
    /// Wrap a raw component index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw component index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// The sole owner and mutator of a set of properties.
///
/// A plugin adds its managers while its initializer runs; the kernel then
/// calls [`DataManager::init`] once, before any later plugin initializes.
/// `init` is where a manager builds its containers from plugin data,
/// registers mutation handlers and labelers, and subscribes to the
/// observation events of the plugins it depends on.
pub trait DataManager: Any {
    /// One-time initialization.
    ///
    /// The manager is detached from the context for the duration of the
    /// call, so looking itself up through `context` fails.
    fn init(&mut self, context: &mut Context, id: ComponentId) -> Result<(), ContractError>;
}
