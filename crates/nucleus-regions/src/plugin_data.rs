//! Initial region state: regions, region properties, and person placement.

use std::collections::{BTreeMap, BTreeSet};

use nucleus_types::{
    ContractError, ContractErrorKind, PersonId, PropertyDefinition, PropertyId, PropertyValue,
    RegionId,
};
use serde::{Deserialize, Serialize};

/// Everything the regions plugin needs to start, and what
/// `RegionsDataManager::to_plugin_data` produces as a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionsPluginData {
    #[serde(default)]
    pub(crate) regions: BTreeSet<RegionId>,

    #[serde(default)]
    pub(crate) property_definitions: BTreeMap<PropertyId, PropertyDefinition>,

    #[serde(default)]
    pub(crate) property_values: BTreeMap<RegionId, BTreeMap<PropertyId, PropertyValue>>,

    #[serde(default)]
    pub(crate) person_regions: BTreeMap<PersonId, RegionId>,
}

impl RegionsPluginData {
    /// Start an empty builder.
    pub fn builder() -> RegionsPluginDataBuilder {
        RegionsPluginDataBuilder::default()
    }

    /// The regions, ascending.
    pub const fn regions(&self) -> &BTreeSet<RegionId> {
        &self.regions
    }

    /// Region property definitions.
    pub const fn property_definitions(&self) -> &BTreeMap<PropertyId, PropertyDefinition> {
        &self.property_definitions
    }

    /// The explicit value of `property` for `region`, if one was given.
    pub fn property_value(
        &self,
        region: RegionId,
        property: &PropertyId,
    ) -> Option<&PropertyValue> {
        self.property_values
            .get(&region)
            .and_then(|values| values.get(property))
    }

    /// The region each person starts in.
    pub const fn person_regions(&self) -> &BTreeMap<PersonId, RegionId> {
        &self.person_regions
    }

    /// Check internal consistency.
    ///
    /// Person existence is checked later, against the people plugin.
    ///
    /// # Errors
    ///
    /// - `NotAnEnumeration` / `IncompatibleValue` for a malformed definition.
    /// - `UnknownRegionId` if a value or placement names an undeclared region.
    /// - `UnknownPropertyId` if a value names an undefined property.
    /// - `IncompatibleValue` if a value does not match its definition.
    /// - `InsufficientDefaultCoverage` if a property without a default is
    ///   missing a value for some region.
    pub fn validate(&self) -> Result<(), ContractError> {
        for definition in self.property_definitions.values() {
            definition.validate()?;
        }
        for (region, values) in &self.property_values {
            self.check_region(*region)?;
            for (property, value) in values {
                let definition = self.property_definitions.get(property).ok_or_else(|| {
                    ContractError::with_details(ContractErrorKind::UnknownPropertyId, property)
                })?;
                definition.check_value(value)?;
            }
        }
        for (property, definition) in &self.property_definitions {
            if definition.has_default() {
                continue;
            }
            if let Some(region) = self
                .regions
                .iter()
                .find(|region| self.property_value(**region, property).is_none())
            {
                return Err(ContractError::with_details(
                    ContractErrorKind::InsufficientDefaultCoverage,
                    format!("{property} has no default and no value for {region}"),
                ));
            }
        }
        for region in self.person_regions.values() {
            self.check_region(*region)?;
        }
        Ok(())
    }

    fn check_region(&self, region: RegionId) -> Result<(), ContractError> {
        if self.regions.contains(&region) {
            Ok(())
        } else {
            Err(ContractError::with_details(
                ContractErrorKind::UnknownRegionId,
                region,
            ))
        }
    }
}

/// Builder for [`RegionsPluginData`].
///
/// Duplicate declarations are remembered and reported by
/// [`RegionsPluginDataBuilder::build`], so calls can be chained freely.
#[derive(Debug, Default)]
pub struct RegionsPluginDataBuilder {
    data: RegionsPluginData,
    error: Option<ContractError>,
}

impl RegionsPluginDataBuilder {
    fn record(&mut self, error: ContractError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Declare a region.
    #[must_use]
    pub fn add_region(mut self, region: RegionId) -> Self {
        if !self.data.regions.insert(region) {
            self.record(ContractError::with_details(
                ContractErrorKind::DuplicateRegionId,
                region,
            ));
        }
        self
    }

    /// Define a region property.
    #[must_use]
    pub fn define_property(mut self, property: PropertyId, definition: PropertyDefinition) -> Self {
        if self.data.property_definitions.contains_key(&property) {
            self.record(ContractError::with_details(
                ContractErrorKind::DuplicatePropertyDefinition,
                &property,
            ));
        } else {
            self.data.property_definitions.insert(property, definition);
        }
        self
    }

    /// Give `region` an explicit value for `property`. Later calls win.
    #[must_use]
    pub fn set_region_property_value(
        mut self,
        region: RegionId,
        property: PropertyId,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.data
            .property_values
            .entry(region)
            .or_default()
            .insert(property, value.into());
        self
    }

    /// Place `person` in `region` at start. Later calls win.
    #[must_use]
    pub fn set_person_region(mut self, person: PersonId, region: RegionId) -> Self {
        self.data.person_regions.insert(person, region);
        self
    }

    /// Validate and finish.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRegionId` or `DuplicatePropertyDefinition` for the
    /// first repeated declaration, otherwise any error from
    /// [`RegionsPluginData::validate`].
    pub fn build(self) -> Result<RegionsPluginData, ContractError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.data.validate()?;
        Ok(self.data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nucleus_types::ValueType;

    use super::*;

    fn elevation() -> PropertyId {
        PropertyId::new("elevation")
    }

    fn no_default() -> PropertyDefinition {
        PropertyDefinition::builder(ValueType::Double).build().unwrap()
    }

    #[test]
    fn builder_collects_regions_values_and_people() {
        let data = RegionsPluginData::builder()
            .add_region(RegionId::new(1))
            .add_region(RegionId::new(2))
            .define_property(elevation(), no_default())
            .set_region_property_value(RegionId::new(1), elevation(), 10.0)
            .set_region_property_value(RegionId::new(2), elevation(), 20.0)
            .set_person_region(PersonId::new(0), RegionId::new(2))
            .build()
            .unwrap();
        assert_eq!(data.regions().len(), 2);
        assert_eq!(
            data.property_value(RegionId::new(2), &elevation()),
            Some(&PropertyValue::Double(20.0))
        );
        assert_eq!(
            data.person_regions().get(&PersonId::new(0)),
            Some(&RegionId::new(2))
        );
    }

    #[test]
    fn duplicates_are_reported() {
        let err = RegionsPluginData::builder()
            .add_region(RegionId::new(1))
            .add_region(RegionId::new(1))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::DuplicateRegionId);

        let err = RegionsPluginData::builder()
            .define_property(elevation(), no_default())
            .define_property(elevation(), no_default())
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::DuplicatePropertyDefinition);
    }

    #[test]
    fn coverage_and_reference_checks() {
        let err = RegionsPluginData::builder()
            .add_region(RegionId::new(1))
            .add_region(RegionId::new(2))
            .define_property(elevation(), no_default())
            .set_region_property_value(RegionId::new(1), elevation(), 10.0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::InsufficientDefaultCoverage);

        let err = RegionsPluginData::builder()
            .add_region(RegionId::new(1))
            .set_person_region(PersonId::new(0), RegionId::new(9))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::UnknownRegionId);

        let err = RegionsPluginData::builder()
            .add_region(RegionId::new(1))
            .set_region_property_value(RegionId::new(1), elevation(), 1.0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::UnknownPropertyId);

        let err = RegionsPluginData::builder()
            .add_region(RegionId::new(1))
            .define_property(elevation(), no_default())
            .set_region_property_value(RegionId::new(1), elevation(), true)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::IncompatibleValue);
    }

    #[test]
    fn json_round_trip() {
        let data = RegionsPluginData::builder()
            .add_region(RegionId::new(3))
            .define_property(
                elevation(),
                PropertyDefinition::builder(ValueType::Int)
                    .default_value(0_i64)
                    .build()
                    .unwrap(),
            )
            .set_region_property_value(RegionId::new(3), elevation(), 7_i64)
            .set_person_region(PersonId::new(4), RegionId::new(3))
            .build()
            .unwrap();
        let json = serde_json::to_string(&data).unwrap();
        let restored: RegionsPluginData = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, data);
    }
}
