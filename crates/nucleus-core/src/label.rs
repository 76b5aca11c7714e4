//! Event labels, labelers, and filters.
//!
//! A labeler computes a key from an observation event (for example "the
//! region the person moved into"). A filter names a labeler and the key it
//! wants. At dispatch the kernel computes each registered labeler's label
//! once and looks up the subscribers registered under it, so a subscriber
//! interested in one region never sees moves into any other.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use nucleus_types::{PersonId, PropertyId, RegionId};

use crate::context::Context;

/// Identifies one labeler among those registered for an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelerId(&'static str);

impl LabelerId {
    /// Create a labeler id from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The labeler's name.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for LabelerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One component of a label key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelValue {
    /// A dense entity index.
    Index(usize),
    /// An integer key.
    Int(i64),
    /// A textual key, such as a property id.
    Text(String),
    /// A boolean key.
    Bool(bool),
}

impl From<PersonId> for LabelValue {
    fn from(id: PersonId) -> Self {
        Self::Index(id.index())
    }
}

impl From<RegionId> for LabelValue {
    fn from(id: RegionId) -> Self {
        Self::Index(id.index())
    }
}

impl From<PropertyId> for LabelValue {
    fn from(id: PropertyId) -> Self {
        Self::Text(id.0)
    }
}

impl From<&PropertyId> for LabelValue {
    fn from(id: &PropertyId) -> Self {
        Self::Text(id.0.clone())
    }
}

impl From<bool> for LabelValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for LabelValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A routing key: event type, labeler, and the key values it produced.
///
/// Two labels are equal only if all three parts are equal, so labels from
/// different event types never collide even when their keys match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventLabel {
    event_type: TypeId,
    labeler_id: LabelerId,
    keys: Vec<LabelValue>,
}

impl EventLabel {
    /// Build a label for event type `E`.
    pub fn new<E: 'static>(labeler_id: LabelerId, keys: Vec<LabelValue>) -> Self {
        Self {
            event_type: TypeId::of::<E>(),
            labeler_id,
            keys,
        }
    }

    /// The event type this label belongs to.
    pub const fn event_type(&self) -> TypeId {
        self.event_type
    }

    /// The labeler that produced this label.
    pub const fn labeler_id(&self) -> LabelerId {
        self.labeler_id
    }

    /// The key values.
    pub fn keys(&self) -> &[LabelValue] {
        &self.keys
    }
}

/// Signature of a label function.
///
/// Labelers are plain functions: they read the event and, if they need to,
/// current state through the context. They capture nothing.
pub type LabelFn<E> = fn(&Context, &E) -> Vec<LabelValue>;

/// Computes label keys from events of type `E`.
pub struct EventLabeler<E> {
    id: LabelerId,
    label_fn: LabelFn<E>,
}

impl<E: 'static> EventLabeler<E> {
    /// Pair a labeler id with its label function.
    pub const fn new(id: LabelerId, label_fn: LabelFn<E>) -> Self {
        Self { id, label_fn }
    }

    /// The labeler's id.
    pub const fn id(&self) -> LabelerId {
        self.id
    }

    /// Compute the label for one event.
    pub fn label(&self, context: &Context, event: &E) -> EventLabel {
        EventLabel::new::<E>(self.id, (self.label_fn)(context, event))
    }
}

impl<E> Clone for EventLabeler<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EventLabeler<E> {}

impl<E> fmt::Debug for EventLabeler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLabeler").field("id", &self.id).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterKind {
    All,
    Keyed {
        labeler_id: LabelerId,
        keys: Vec<LabelValue>,
    },
}

/// Selects which events of type `E` a subscriber receives.
pub struct EventFilter<E> {
    kind: FilterKind,
    _event: PhantomData<fn(&E)>,
}

impl<E: 'static> EventFilter<E> {
    /// Match every event of type `E`.
    pub const fn all() -> Self {
        Self {
            kind: FilterKind::All,
            _event: PhantomData,
        }
    }

    /// Match events whose label under `labeler_id` equals `keys`.
    pub const fn keyed(labeler_id: LabelerId, keys: Vec<LabelValue>) -> Self {
        Self {
            kind: FilterKind::Keyed { labeler_id, keys },
            _event: PhantomData,
        }
    }

    /// Whether this filter matches every event.
    pub const fn is_all(&self) -> bool {
        matches!(self.kind, FilterKind::All)
    }

    /// The labeler a keyed filter relies on.
    pub const fn labeler_id(&self) -> Option<LabelerId> {
        match &self.kind {
            FilterKind::All => None,
            FilterKind::Keyed { labeler_id, .. } => Some(*labeler_id),
        }
    }

    /// The label a keyed filter listens on.
    pub fn label(&self) -> Option<EventLabel> {
        match &self.kind {
            FilterKind::All => None,
            FilterKind::Keyed { labeler_id, keys } => {
                Some(EventLabel::new::<E>(*labeler_id, keys.clone()))
            }
        }
    }
}

impl<E> Clone for EventFilter<E> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            _event: PhantomData,
        }
    }
}

impl<E> PartialEq for EventFilter<E> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl<E> fmt::Debug for EventFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFilter").field("kind", &self.kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Moved;
    struct Added;

    const ARRIVAL: LabelerId = LabelerId::new("arrival");

    #[test]
    fn labels_differ_by_event_type() {
        let keys = vec![LabelValue::Index(1)];
        let a = EventLabel::new::<Moved>(ARRIVAL, keys.clone());
        let b = EventLabel::new::<Added>(ARRIVAL, keys.clone());
        assert_ne!(a, b);
        assert_eq!(a, EventLabel::new::<Moved>(ARRIVAL, keys));
    }

    #[test]
    fn filter_label_matches_labeler_output() {
        let filter = EventFilter::<Moved>::keyed(ARRIVAL, vec![RegionId::new(2).into()]);
        assert_eq!(filter.labeler_id(), Some(ARRIVAL));
        assert!(!filter.is_all());
        let expected = EventLabel::new::<Moved>(ARRIVAL, vec![LabelValue::Index(2)]);
        assert_eq!(filter.label(), Some(expected));

        let all = EventFilter::<Moved>::all();
        assert!(all.is_all());
        assert_eq!(all.label(), None);
    }

    #[test]
    fn label_values_from_ids() {
        assert_eq!(LabelValue::from(PersonId::new(4)), LabelValue::Index(4));
        assert_eq!(
            LabelValue::from(&PropertyId::new("terrain")),
            LabelValue::Text("terrain".to_owned())
        );
        assert_eq!(ARRIVAL.to_string(), "arrival");
    }
}
