//! Mutation and observation events of the regions plugin, with their
//! labelers and filter constructors.
//!
//! Filter constructors validate their keys against current state, so a
//! subscription on a region that does not exist fails up front instead of
//! silently never firing.

use std::collections::BTreeMap;

use nucleus_core::{
    Context, EventFilter, EventLabeler, LabelValue, LabelerId, MutationEvent, ObservationEvent,
};
use nucleus_people::PeopleDataManager;
use nucleus_types::{
    ContractError, PersonId, PropertyDefinition, PropertyId, PropertyValue, RegionId,
};

use crate::manager::RegionsDataManager;

// ----------------------------------------------------------------------
// Mutations
// ----------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct PersonRegionMutation {
    pub(crate) person: PersonId,
    pub(crate) region: RegionId,
}

impl MutationEvent for PersonRegionMutation {}

#[derive(Debug)]
pub(crate) struct RegionAdditionMutation {
    pub(crate) region: RegionId,
    pub(crate) values: BTreeMap<PropertyId, PropertyValue>,
}

impl MutationEvent for RegionAdditionMutation {}

#[derive(Debug)]
pub(crate) struct RegionPropertyValueMutation {
    pub(crate) region: RegionId,
    pub(crate) property: PropertyId,
    pub(crate) value: PropertyValue,
}

impl MutationEvent for RegionPropertyValueMutation {}

#[derive(Debug)]
pub(crate) struct RegionPropertyDefinitionMutation {
    pub(crate) property: PropertyId,
    pub(crate) definition: PropertyDefinition,
    pub(crate) values: BTreeMap<RegionId, PropertyValue>,
}

impl MutationEvent for RegionPropertyDefinitionMutation {}

// ----------------------------------------------------------------------
// Person region updates
// ----------------------------------------------------------------------

/// A person moved from one region to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonRegionUpdateEvent {
    /// The person who moved.
    pub person: PersonId,
    /// The region the person left.
    pub previous_region: RegionId,
    /// The region the person is now in.
    pub current_region: RegionId,
}

impl ObservationEvent for PersonRegionUpdateEvent {}

impl PersonRegionUpdateEvent {
    /// Labels by the person who moved.
    pub const PERSON_LABELER: LabelerId = LabelerId::new("person");
    /// Labels by the region entered.
    pub const ARRIVAL_LABELER: LabelerId = LabelerId::new("arrival_region");
    /// Labels by the region left.
    pub const DEPARTURE_LABELER: LabelerId = LabelerId::new("departure_region");

    pub(crate) fn labelers() -> [EventLabeler<Self>; 3] {
        [
            EventLabeler::new(Self::PERSON_LABELER, |_context, event| {
                vec![LabelValue::from(event.person)]
            }),
            EventLabeler::new(Self::ARRIVAL_LABELER, |_context, event| {
                vec![LabelValue::from(event.current_region)]
            }),
            EventLabeler::new(Self::DEPARTURE_LABELER, |_context, event| {
                vec![LabelValue::from(event.previous_region)]
            }),
        ]
    }

    /// Every region update.
    pub const fn filter_all() -> EventFilter<Self> {
        EventFilter::all()
    }

    /// Updates for one person.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPersonId` if the person does not exist.
    pub fn filter_by_person(
        context: &Context,
        person: PersonId,
    ) -> Result<EventFilter<Self>, ContractError> {
        context
            .data_manager::<PeopleDataManager>()?
            .validate_person(person)?;
        Ok(EventFilter::keyed(Self::PERSON_LABELER, vec![person.into()]))
    }

    /// Updates moving people into `region`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId` if the region does not exist.
    pub fn filter_by_arrival_region(
        context: &Context,
        region: RegionId,
    ) -> Result<EventFilter<Self>, ContractError> {
        context
            .data_manager::<RegionsDataManager>()?
            .validate_region(region)?;
        Ok(EventFilter::keyed(Self::ARRIVAL_LABELER, vec![region.into()]))
    }

    /// Updates moving people out of `region`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId` if the region does not exist.
    pub fn filter_by_departure_region(
        context: &Context,
        region: RegionId,
    ) -> Result<EventFilter<Self>, ContractError> {
        context
            .data_manager::<RegionsDataManager>()?
            .validate_region(region)?;
        Ok(EventFilter::keyed(Self::DEPARTURE_LABELER, vec![region.into()]))
    }
}

// ----------------------------------------------------------------------
// Region lifecycle
// ----------------------------------------------------------------------

/// A region was added after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionAdditionEvent {
    /// The new region.
    pub region: RegionId,
}

impl ObservationEvent for RegionAdditionEvent {}

/// A region property was defined after initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPropertyDefinitionEvent {
    /// The new property.
    pub property: PropertyId,
}

impl ObservationEvent for RegionPropertyDefinitionEvent {}

// ----------------------------------------------------------------------
// Region property updates
// ----------------------------------------------------------------------

/// A region property value changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPropertyUpdateEvent {
    /// The region whose value changed.
    pub region: RegionId,
    /// The property that changed.
    pub property: PropertyId,
    /// The value before the change.
    pub previous_value: PropertyValue,
    /// The value after the change.
    pub current_value: PropertyValue,
}

impl ObservationEvent for RegionPropertyUpdateEvent {}

impl RegionPropertyUpdateEvent {
    /// Labels by region.
    pub const REGION_LABELER: LabelerId = LabelerId::new("region");
    /// Labels by property.
    pub const PROPERTY_LABELER: LabelerId = LabelerId::new("property");
    /// Labels by region and property together.
    pub const REGION_PROPERTY_LABELER: LabelerId = LabelerId::new("region_property");

    pub(crate) fn labelers() -> [EventLabeler<Self>; 3] {
        [
            EventLabeler::new(Self::REGION_LABELER, |_context, event| {
                vec![LabelValue::from(event.region)]
            }),
            EventLabeler::new(Self::PROPERTY_LABELER, |_context, event| {
                vec![LabelValue::from(&event.property)]
            }),
            EventLabeler::new(Self::REGION_PROPERTY_LABELER, |_context, event| {
                vec![LabelValue::from(event.region), LabelValue::from(&event.property)]
            }),
        ]
    }

    /// Every property update.
    pub const fn filter_all() -> EventFilter<Self> {
        EventFilter::all()
    }

    /// Updates to any property of `region`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId` if the region does not exist.
    pub fn filter_by_region(
        context: &Context,
        region: RegionId,
    ) -> Result<EventFilter<Self>, ContractError> {
        context
            .data_manager::<RegionsDataManager>()?
            .validate_region(region)?;
        Ok(EventFilter::keyed(Self::REGION_LABELER, vec![region.into()]))
    }

    /// Updates to `property` in any region.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPropertyId` if the property is not defined.
    pub fn filter_by_property(
        context: &Context,
        property: &PropertyId,
    ) -> Result<EventFilter<Self>, ContractError> {
        context
            .data_manager::<RegionsDataManager>()?
            .property_definition(property)?;
        Ok(EventFilter::keyed(Self::PROPERTY_LABELER, vec![property.into()]))
    }

    /// Updates to `property` in `region`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId` or `UnknownPropertyId`.
    pub fn filter_by_region_and_property(
        context: &Context,
        region: RegionId,
        property: &PropertyId,
    ) -> Result<EventFilter<Self>, ContractError> {
        let manager = context.data_manager::<RegionsDataManager>()?;
        manager.validate_region(region)?;
        manager.property_definition(property)?;
        Ok(EventFilter::keyed(
            Self::REGION_PROPERTY_LABELER,
            vec![region.into(), property.into()],
        ))
    }
}
