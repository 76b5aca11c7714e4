//! Per-event-type subscriber registry.
//!
//! Each observation event type gets its own [`EventSubscriptions`] table,
//! stored type-erased in [`Subscriptions`]. A table holds the labelers
//! registered for the type, one handler per subscriber, and the routing
//! indices: subscribers with an unfiltered subscription, and subscribers
//! keyed by [`EventLabel`].

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use indexmap::IndexMap;
use nucleus_types::{ContractError, ContractErrorKind};

use crate::context::Context;
use crate::label::{EventFilter, EventLabel, EventLabeler, LabelerId};
use crate::manager::ComponentId;

/// A subscriber's callback for events of type `E`.
pub type ObservationHandler<E> = Rc<dyn Fn(&mut Context, &E) -> Result<(), ContractError>>;

/// Subscribers and labelers for one observation event type.
pub(crate) struct EventSubscriptions<E> {
    labelers: IndexMap<LabelerId, EventLabeler<E>>,
    handlers: BTreeMap<ComponentId, ObservationHandler<E>>,
    filter_counts: BTreeMap<ComponentId, usize>,
    unfiltered: BTreeSet<ComponentId>,
    keyed: HashMap<EventLabel, BTreeSet<ComponentId>>,
    keyed_per_labeler: HashMap<LabelerId, usize>,
}

impl<E: 'static> EventSubscriptions<E> {
    fn new() -> Self {
        Self {
            labelers: IndexMap::new(),
            handlers: BTreeMap::new(),
            filter_counts: BTreeMap::new(),
            unfiltered: BTreeSet::new(),
            keyed: HashMap::new(),
            keyed_per_labeler: HashMap::new(),
        }
    }

    pub(crate) fn add_labeler(&mut self, labeler: EventLabeler<E>) -> Result<(), ContractError> {
        if self.labelers.contains_key(&labeler.id()) {
            return Err(ContractError::with_details(
                ContractErrorKind::DuplicateLabeler,
                format!("{} for {}", labeler.id(), std::any::type_name::<E>()),
            ));
        }
        self.labelers.insert(labeler.id(), labeler);
        Ok(())
    }

    pub(crate) fn has_labeler(&self, id: LabelerId) -> bool {
        self.labelers.contains_key(&id)
    }

    pub(crate) fn has_subscribers(&self) -> bool {
        !self.handlers.is_empty()
    }

    /// Register `filter` for `subscriber` and install (or replace) its handler.
    ///
    /// The filter's labeler must already be registered.
    pub(crate) fn subscribe(
        &mut self,
        subscriber: ComponentId,
        filter: &EventFilter<E>,
        handler: ObservationHandler<E>,
    ) {
        let added = match filter.label() {
            None => self.unfiltered.insert(subscriber),
            Some(label) => {
                let labeler_id = label.labeler_id();
                let added = self.keyed.entry(label).or_default().insert(subscriber);
                if added {
                    let count = self.keyed_per_labeler.entry(labeler_id).or_insert(0);
                    *count = count.saturating_add(1);
                }
                added
            }
        };
        if added {
            let count = self.filter_counts.entry(subscriber).or_insert(0);
            *count = count.saturating_add(1);
        }
        self.handlers.insert(subscriber, handler);
    }

    /// Remove one filter. Returns `false` if the subscriber never held it.
    pub(crate) fn unsubscribe(&mut self, subscriber: ComponentId, filter: &EventFilter<E>) -> bool {
        let removed = match filter.label() {
            None => self.unfiltered.remove(&subscriber),
            Some(label) => {
                let labeler_id = label.labeler_id();
                let removed = self
                    .keyed
                    .get_mut(&label)
                    .is_some_and(|ids| ids.remove(&subscriber));
                if removed {
                    if self.keyed.get(&label).is_some_and(BTreeSet::is_empty) {
                        self.keyed.remove(&label);
                    }
                    if let Some(count) = self.keyed_per_labeler.get_mut(&labeler_id) {
                        *count = count.saturating_sub(1);
                    }
                }
                removed
            }
        };
        if removed {
            let remaining = self.filter_counts.get_mut(&subscriber).map(|count| {
                *count = count.saturating_sub(1);
                *count
            });
            if remaining == Some(0) {
                self.filter_counts.remove(&subscriber);
                self.handlers.remove(&subscriber);
            }
        }
        removed
    }

    /// Handlers matching `event`, one per subscriber, in ascending id order.
    pub(crate) fn matching(&self, context: &Context, event: &E) -> Vec<ObservationHandler<E>> {
        let mut matched: BTreeSet<ComponentId> = self.unfiltered.clone();
        for labeler in self.labelers.values() {
            let in_use = self
                .keyed_per_labeler
                .get(&labeler.id())
                .is_some_and(|&count| count > 0);
            if !in_use {
                continue;
            }
            let label = labeler.label(context, event);
            if let Some(ids) = self.keyed.get(&label) {
                matched.extend(ids.iter().copied());
            }
        }
        matched
            .into_iter()
            .filter_map(|id| self.handlers.get(&id).cloned())
            .collect()
    }
}

/// Type-erased map from observation event type to its subscription table.
#[derive(Default)]
pub(crate) struct Subscriptions {
    tables: HashMap<TypeId, Box<dyn Any>>,
}

impl Subscriptions {
    pub(crate) fn get<E: 'static>(&self) -> Option<&EventSubscriptions<E>> {
        self.tables
            .get(&TypeId::of::<E>())
            .and_then(|table| table.downcast_ref::<EventSubscriptions<E>>())
    }

    /// Run `f` against the table for `E`, creating it first if needed.
    pub(crate) fn with_table<E: 'static, R>(
        &mut self,
        f: impl FnOnce(&mut EventSubscriptions<E>) -> R,
    ) -> R {
        let mut table = self
            .tables
            .remove(&TypeId::of::<E>())
            .and_then(|boxed| boxed.downcast::<EventSubscriptions<E>>().ok())
            .unwrap_or_else(|| Box::new(EventSubscriptions::new()));
        let result = f(&mut table);
        self.tables.insert(TypeId::of::<E>(), table);
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::label::LabelValue;

    #[derive(Debug)]
    struct Ping(usize);

    const PARITY: LabelerId = LabelerId::new("parity");

    fn parity(_context: &Context, event: &Ping) -> Vec<LabelValue> {
        vec![LabelValue::Bool(event.0 % 2 == 0)]
    }

    fn noop() -> ObservationHandler<Ping> {
        Rc::new(|_context: &mut Context, _event: &Ping| Ok::<(), ContractError>(()))
    }

    #[test]
    fn duplicate_labeler_rejected() {
        let mut subs = Subscriptions::default();
        subs.with_table::<Ping, _>(|t| t.add_labeler(EventLabeler::new(PARITY, parity)))
            .unwrap();
        let err = subs
            .with_table::<Ping, _>(|t| t.add_labeler(EventLabeler::new(PARITY, parity)))
            .unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::DuplicateLabeler);
    }

    #[test]
    fn handler_dropped_when_last_filter_removed() {
        let mut subs = Subscriptions::default();
        let id = ComponentId::new(3);
        let even = EventFilter::<Ping>::keyed(PARITY, vec![LabelValue::Bool(true)]);
        subs.with_table::<Ping, _>(|t| {
            t.add_labeler(EventLabeler::new(PARITY, parity)).unwrap();
            t.subscribe(id, &EventFilter::all(), noop());
            t.subscribe(id, &even, noop());
        });
        assert!(subs.get::<Ping>().unwrap().has_subscribers());

        assert!(subs.with_table::<Ping, _>(|t| t.unsubscribe(id, &EventFilter::all())));
        assert!(subs.get::<Ping>().unwrap().has_subscribers());
        assert!(!subs.with_table::<Ping, _>(|t| t.unsubscribe(id, &EventFilter::all())));
        assert!(subs.with_table::<Ping, _>(|t| t.unsubscribe(id, &even)));
        assert!(!subs.get::<Ping>().unwrap().has_subscribers());
    }

    #[test]
    fn unknown_event_type_has_no_table() {
        let subs = Subscriptions::default();
        assert!(subs.get::<Ping>().is_none());
    }
}
