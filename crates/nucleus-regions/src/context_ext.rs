//! Region operations as methods on [`Context`].

use std::collections::BTreeMap;

use nucleus_core::Context;
use nucleus_types::{
    ContractError, ContractErrorKind, PersonId, PropertyDefinition, PropertyId, PropertyValue,
    RegionId,
};

use crate::events::{
    PersonRegionMutation, RegionAdditionMutation, RegionPropertyDefinitionMutation,
    RegionPropertyValueMutation,
};
use crate::manager::RegionsDataManager;

/// Moves people between regions and maintains region properties.
pub trait ContextRegionsExt {
    /// Move `person` to `region`.
    ///
    /// Moving a person to the region they are already in changes nothing and
    /// releases no event.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPersonId` or `UnknownRegionId`.
    fn set_person_region(
        &mut self,
        person: PersonId,
        region: RegionId,
    ) -> Result<(), ContractError>;

    /// Add a region with explicit values for some of its properties.
    ///
    /// # Errors
    ///
    /// - `DuplicateRegionId` if the region exists.
    /// - `UnknownPropertyId` or `IncompatibleValue` for a bad value.
    /// - `InsufficientDefaultCoverage` if a property without a default is
    ///   missing from `values`.
    fn add_region(
        &mut self,
        region: RegionId,
        values: BTreeMap<PropertyId, PropertyValue>,
    ) -> Result<(), ContractError>;

    /// Update one property value of one region.
    ///
    /// # Errors
    ///
    /// `UnknownRegionId`, `UnknownPropertyId`, `ImmutableValue`, or
    /// `IncompatibleValue`.
    fn set_region_property_value(
        &mut self,
        region: RegionId,
        property: PropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ContractError>;

    /// Define a new region property, with values for existing regions.
    ///
    /// # Errors
    ///
    /// `DuplicatePropertyDefinition`, `UnknownRegionId`,
    /// `IncompatibleValue`, or `InsufficientDefaultCoverage`.
    fn define_region_property(
        &mut self,
        property: PropertyId,
        definition: PropertyDefinition,
        values: BTreeMap<RegionId, PropertyValue>,
    ) -> Result<(), ContractError>;

    /// The region `person` is in.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPersonId` if the person has no region.
    fn person_region(&self, person: PersonId) -> Result<RegionId, ContractError>;

    /// The people in `region`, ascending.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId`.
    fn people_in_region(&self, region: RegionId) -> Result<Vec<PersonId>, ContractError>;

    /// The current value of a region property.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId` or `UnknownPropertyId`.
    fn region_property_value(
        &self,
        region: RegionId,
        property: &PropertyId,
    ) -> Result<PropertyValue, ContractError>;
}

impl ContextRegionsExt for Context {
    fn set_person_region(
        &mut self,
        person: PersonId,
        region: RegionId,
    ) -> Result<(), ContractError> {
        self.release_mutation(PersonRegionMutation { person, region })
    }

    fn add_region(
        &mut self,
        region: RegionId,
        values: BTreeMap<PropertyId, PropertyValue>,
    ) -> Result<(), ContractError> {
        self.release_mutation(RegionAdditionMutation { region, values })
    }

    fn set_region_property_value(
        &mut self,
        region: RegionId,
        property: PropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ContractError> {
        self.release_mutation(RegionPropertyValueMutation {
            region,
            property,
            value: value.into(),
        })
    }

    fn define_region_property(
        &mut self,
        property: PropertyId,
        definition: PropertyDefinition,
        values: BTreeMap<RegionId, PropertyValue>,
    ) -> Result<(), ContractError> {
        self.release_mutation(RegionPropertyDefinitionMutation {
            property,
            definition,
            values,
        })
    }

    fn person_region(&self, person: PersonId) -> Result<RegionId, ContractError> {
        self.data_manager::<RegionsDataManager>()?
            .person_region(person)
            .ok_or_else(|| {
                ContractError::with_details(ContractErrorKind::UnknownPersonId, person)
            })
    }

    fn people_in_region(&self, region: RegionId) -> Result<Vec<PersonId>, ContractError> {
        self.data_manager::<RegionsDataManager>()?
            .people_in_region(region)
    }

    fn region_property_value(
        &self,
        region: RegionId,
        property: &PropertyId,
    ) -> Result<PropertyValue, ContractError> {
        self.data_manager::<RegionsDataManager>()?
            .region_property_value(region, property)
    }
}
