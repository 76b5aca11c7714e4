//! Mutation and observation events of the people plugin.

use nucleus_core::{MutationEvent, ObservationEvent};
use nucleus_types::PersonId;

use crate::construction::PersonConstructionData;

#[derive(Debug)]
pub(crate) struct PersonAdditionMutation {
    pub(crate) construction: PersonConstructionData,
}

impl MutationEvent for PersonAdditionMutation {}

#[derive(Debug)]
pub(crate) struct PersonRemovalMutation {
    pub(crate) person: PersonId,
}

impl MutationEvent for PersonRemovalMutation {}

/// A person id has been allocated and dependent plugins must check the
/// construction data before the addition commits.
///
/// Always released, whether or not anyone subscribes. If a subscriber
/// fails, the id is retracted and the addition fails. Subscribers that ran
/// earlier are not told, so per-person state belongs in a
/// [`PersonAdditionEvent`] handler, not here.
#[derive(Debug, Clone)]
pub struct PersonImminentAdditionEvent {
    /// The new person.
    pub person: PersonId,
    /// Auxiliary values supplied by the caller of `add_person`.
    pub construction: PersonConstructionData,
}

impl ObservationEvent for PersonImminentAdditionEvent {}

/// A person has been fully added.
///
/// Released whenever anyone subscribes, which includes every plugin that
/// keeps per-person state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonAdditionEvent {
    /// The new person.
    pub person: PersonId,
}

impl ObservationEvent for PersonAdditionEvent {}

/// A person has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonRemovalEvent {
    /// The removed person.
    pub person: PersonId,
}

impl ObservationEvent for PersonRemovalEvent {}
