//! The regions data manager and its mutation handlers.

use std::collections::{BTreeMap, BTreeSet};

use nucleus_containers::{IntValueContainer, PropertyValueContainer};
use nucleus_core::{ComponentId, Context, DataManager, EventFilter};
use nucleus_people::{
    PeopleDataManager, PersonAdditionEvent, PersonImminentAdditionEvent, PersonRemovalEvent,
};
use nucleus_types::{
    ContractError, ContractErrorKind, PersonId, PropertyDefinition, PropertyId, PropertyValue,
    RegionId,
};
use tracing::{debug, trace};

use crate::events::{
    PersonRegionMutation, PersonRegionUpdateEvent, RegionAdditionEvent, RegionAdditionMutation,
    RegionPropertyDefinitionEvent, RegionPropertyDefinitionMutation, RegionPropertyUpdateEvent,
    RegionPropertyValueMutation,
};
use crate::plugin_data::RegionsPluginData;

/// Owns regions, region property values, and which region each person is in.
///
/// A person's region is kept in an [`IntValueContainer`] indexed by person
/// as `region index + 1`, leaving zero for "no region". With few regions
/// the container stays at byte width.
///
/// A new person's region is checked while the addition is imminent and only
/// written once the addition commits, so a rejected addition leaves nothing
/// behind.
#[derive(Debug)]
pub struct RegionsDataManager {
    plugin_data: Option<RegionsPluginData>,
    regions: BTreeSet<RegionId>,
    person_regions: IntValueContainer,
    people_by_region: BTreeMap<RegionId, BTreeSet<PersonId>>,
    pending_placements: BTreeMap<PersonId, RegionId>,
    definitions: BTreeMap<PropertyId, PropertyDefinition>,
    property_values: BTreeMap<PropertyId, PropertyValueContainer>,
}

impl RegionsDataManager {
    /// A manager that will start from `plugin_data`.
    pub fn new(plugin_data: RegionsPluginData) -> Self {
        Self {
            plugin_data: Some(plugin_data),
            regions: BTreeSet::new(),
            person_regions: IntValueContainer::new(0),
            people_by_region: BTreeMap::new(),
            pending_placements: BTreeMap::new(),
            definitions: BTreeMap::new(),
            property_values: BTreeMap::new(),
        }
    }

    /// Whether `region` exists.
    pub fn region_exists(&self, region: RegionId) -> bool {
        self.regions.contains(&region)
    }

    /// Fail with `UnknownRegionId` unless `region` exists.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId` if the region was never added.
    pub fn validate_region(&self, region: RegionId) -> Result<(), ContractError> {
        if self.region_exists(region) {
            Ok(())
        } else {
            Err(ContractError::with_details(
                ContractErrorKind::UnknownRegionId,
                region,
            ))
        }
    }

    /// Every region, ascending.
    pub fn region_ids(&self) -> Vec<RegionId> {
        self.regions.iter().copied().collect()
    }

    /// Every defined region property, ascending.
    pub fn property_ids(&self) -> Vec<PropertyId> {
        self.definitions.keys().cloned().collect()
    }

    /// The definition of a region property.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPropertyId` if the property is not defined.
    pub fn property_definition(
        &self,
        property: &PropertyId,
    ) -> Result<&PropertyDefinition, ContractError> {
        self.definitions.get(property).ok_or_else(|| {
            ContractError::with_details(ContractErrorKind::UnknownPropertyId, property)
        })
    }

    /// The region `person` is in, or `None` if unassigned.
    pub fn person_region(&self, person: PersonId) -> Option<RegionId> {
        let stored = self.person_regions.get_long(person.index());
        usize::try_from(stored)
            .ok()
            .and_then(|value| value.checked_sub(1))
            .map(RegionId::new)
    }

    /// The people in `region`, ascending.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId` if the region does not exist.
    pub fn people_in_region(&self, region: RegionId) -> Result<Vec<PersonId>, ContractError> {
        self.validate_region(region)?;
        Ok(self
            .people_by_region
            .get(&region)
            .map(|people| people.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Number of people in `region`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId` if the region does not exist.
    pub fn person_count_in_region(&self, region: RegionId) -> Result<usize, ContractError> {
        self.validate_region(region)?;
        Ok(self.people_by_region.get(&region).map_or(0, BTreeSet::len))
    }

    /// The current value of `property` for `region`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegionId` or `UnknownPropertyId`.
    pub fn region_property_value(
        &self,
        region: RegionId,
        property: &PropertyId,
    ) -> Result<PropertyValue, ContractError> {
        self.validate_region(region)?;
        self.property_definition(property)?;
        self.property_values
            .get(property)
            .map(|container| container.get(region.index()))
            .transpose()?
            .flatten()
            .ok_or_else(|| {
                ContractError::with_details(
                    ContractErrorKind::InsufficientDefaultCoverage,
                    format!("{property} has no value for {region}"),
                )
            })
    }

    /// Plugin data reproducing the current regions state.
    ///
    /// Every property value is written out explicitly, so the snapshot does
    /// not depend on defaults.
    ///
    /// # Errors
    ///
    /// Fails only if a stored value cannot be read back.
    pub fn to_plugin_data(&self) -> Result<RegionsPluginData, ContractError> {
        let mut property_values: BTreeMap<RegionId, BTreeMap<PropertyId, PropertyValue>> =
            BTreeMap::new();
        for &region in &self.regions {
            for property in self.definitions.keys() {
                let value = self.region_property_value(region, property)?;
                property_values
                    .entry(region)
                    .or_default()
                    .insert(property.clone(), value);
            }
        }
        let person_regions = self
            .people_by_region
            .iter()
            .flat_map(|(region, people)| people.iter().map(move |person| (*person, *region)))
            .collect();
        Ok(RegionsPluginData {
            regions: self.regions.clone(),
            property_definitions: self.definitions.clone(),
            property_values,
            person_regions,
        })
    }

    fn assign(&mut self, person: PersonId, region: RegionId) -> Result<(), ContractError> {
        let stored = region
            .index()
            .checked_add(1)
            .and_then(|value| i64::try_from(value).ok())
            .ok_or_else(|| {
                ContractError::with_details(ContractErrorKind::ArithmeticOverflow, region)
            })?;
        self.unassign(person);
        self.person_regions.set_long(person.index(), stored);
        self.people_by_region.entry(region).or_default().insert(person);
        Ok(())
    }

    fn unassign(&mut self, person: PersonId) -> Option<RegionId> {
        let region = self.person_region(person)?;
        self.person_regions.set_long(person.index(), 0);
        if let Some(people) = self.people_by_region.get_mut(&region) {
            people.remove(&person);
        }
        Some(region)
    }

    fn write_value(
        &mut self,
        region: RegionId,
        property: &PropertyId,
        value: &PropertyValue,
    ) -> Result<(), ContractError> {
        let container = self.property_values.get_mut(property).ok_or_else(|| {
            ContractError::with_details(ContractErrorKind::UnknownPropertyId, property)
        })?;
        container.set(region.index(), value)?;
        Ok(())
    }

    /// Check `values` for a new region against the property definitions.
    fn check_region_values(
        &self,
        values: &BTreeMap<PropertyId, PropertyValue>,
    ) -> Result<(), ContractError> {
        for (property, value) in values {
            self.property_definition(property)?.check_value(value)?;
        }
        for (property, definition) in &self.definitions {
            if !definition.has_default() && !values.contains_key(property) {
                return Err(ContractError::with_details(
                    ContractErrorKind::InsufficientDefaultCoverage,
                    format!("{property} has no default and no value was given"),
                ));
            }
        }
        Ok(())
    }

    fn load(&mut self, context: &Context, data: &RegionsPluginData) -> Result<(), ContractError> {
        self.regions.clone_from(&data.regions);
        for (property, definition) in &data.property_definitions {
            let mut container = PropertyValueContainer::for_definition(definition)?;
            for &region in &data.regions {
                if let Some(value) = data.property_value(region, property) {
                    container.set(region.index(), value)?;
                }
            }
            self.property_values.insert(property.clone(), container);
        }
        self.definitions.clone_from(&data.property_definitions);

        let people = context.data_manager::<PeopleDataManager>()?;
        for (&person, &region) in &data.person_regions {
            people.validate_person(person)?;
            self.assign(person, region)?;
        }
        if let Some(person) = people
            .person_ids()
            .into_iter()
            .find(|&person| self.person_region(person).is_none())
        {
            return Err(ContractError::with_details(
                ContractErrorKind::InsufficientDefaultCoverage,
                format!("{person} has no region"),
            ));
        }
        Ok(())
    }
}

impl DataManager for RegionsDataManager {
    fn init(&mut self, context: &mut Context, id: ComponentId) -> Result<(), ContractError> {
        let data = self.plugin_data.take().unwrap_or_default();
        data.validate()?;
        self.load(context, &data)?;

        for labeler in PersonRegionUpdateEvent::labelers() {
            context.add_event_labeler(labeler)?;
        }
        for labeler in RegionPropertyUpdateEvent::labelers() {
            context.add_event_labeler(labeler)?;
        }

        context.register_mutation_handler(handle_person_region)?;
        context.register_mutation_handler(handle_region_addition)?;
        context.register_mutation_handler(handle_region_property_value)?;
        context.register_mutation_handler(handle_region_property_definition)?;

        context.subscribe(id, EventFilter::all(), handle_person_imminent_addition)?;
        context.subscribe(id, EventFilter::all(), handle_person_addition)?;
        context.subscribe(id, EventFilter::all(), handle_person_removal)?;

        debug!(
            component = %id,
            regions = self.regions.len(),
            properties = self.definitions.len(),
            "Regions initialized"
        );
        Ok(())
    }
}

// ----------------------------------------------------------------------
// People plugin reactions
// ----------------------------------------------------------------------

fn handle_person_imminent_addition(
    context: &mut Context,
    event: &PersonImminentAdditionEvent,
) -> Result<(), ContractError> {
    let region = *event.construction.value::<RegionId>().ok_or_else(|| {
        ContractError::with_details(
            ContractErrorKind::MissingConstructionData,
            format!("{} needs a region", event.person),
        )
    })?;
    let manager = context.data_manager_mut::<RegionsDataManager>()?;
    manager.validate_region(region)?;
    // Overwrites any placement left by an earlier rejected addition of this id.
    manager.pending_placements.insert(event.person, region);
    Ok(())
}

fn handle_person_addition(
    context: &mut Context,
    event: &PersonAdditionEvent,
) -> Result<(), ContractError> {
    let manager = context.data_manager_mut::<RegionsDataManager>()?;
    let region = manager
        .pending_placements
        .remove(&event.person)
        .ok_or_else(|| {
            ContractError::with_details(
                ContractErrorKind::MissingConstructionData,
                format!("{} was added without a region", event.person),
            )
        })?;
    manager.assign(event.person, region)?;
    trace!(person = %event.person, %region, "Person placed");
    Ok(())
}

fn handle_person_removal(
    context: &mut Context,
    event: &PersonRemovalEvent,
) -> Result<(), ContractError> {
    let region = context
        .data_manager_mut::<RegionsDataManager>()?
        .unassign(event.person);
    trace!(person = %event.person, ?region, "Person left regions");
    Ok(())
}

// ----------------------------------------------------------------------
// Mutation handlers
// ----------------------------------------------------------------------

fn handle_person_region(
    context: &mut Context,
    mutation: PersonRegionMutation,
) -> Result<(), ContractError> {
    let PersonRegionMutation { person, region } = mutation;
    context
        .data_manager::<PeopleDataManager>()?
        .validate_person(person)?;
    let manager = context.data_manager_mut::<RegionsDataManager>()?;
    manager.validate_region(region)?;
    let previous_region = manager.person_region(person).ok_or_else(|| {
        ContractError::with_details(
            ContractErrorKind::UnknownPersonId,
            format!("{person} has no region"),
        )
    })?;
    if previous_region == region {
        return Ok(());
    }
    manager.assign(person, region)?;

    if context.subscribers_exist::<PersonRegionUpdateEvent>() {
        context.release_observation(PersonRegionUpdateEvent {
            person,
            previous_region,
            current_region: region,
        })?;
    }
    Ok(())
}

fn handle_region_addition(
    context: &mut Context,
    mutation: RegionAdditionMutation,
) -> Result<(), ContractError> {
    let RegionAdditionMutation { region, values } = mutation;
    let manager = context.data_manager_mut::<RegionsDataManager>()?;
    if manager.region_exists(region) {
        return Err(ContractError::with_details(
            ContractErrorKind::DuplicateRegionId,
            region,
        ));
    }
    manager.check_region_values(&values)?;
    for (property, value) in &values {
        manager.write_value(region, property, value)?;
    }
    manager.regions.insert(region);
    debug!(%region, "Region added");

    if context.subscribers_exist::<RegionAdditionEvent>() {
        context.release_observation(RegionAdditionEvent { region })?;
    }
    Ok(())
}

fn handle_region_property_value(
    context: &mut Context,
    mutation: RegionPropertyValueMutation,
) -> Result<(), ContractError> {
    let RegionPropertyValueMutation {
        region,
        property,
        value,
    } = mutation;
    let manager = context.data_manager_mut::<RegionsDataManager>()?;
    let definition = manager.property_definition(&property)?;
    if !definition.is_mutable() {
        return Err(ContractError::with_details(
            ContractErrorKind::ImmutableValue,
            &property,
        ));
    }
    definition.check_value(&value)?;
    let previous_value = manager.region_property_value(region, &property)?;
    manager.write_value(region, &property, &value)?;

    if context.subscribers_exist::<RegionPropertyUpdateEvent>() {
        context.release_observation(RegionPropertyUpdateEvent {
            region,
            property,
            previous_value,
            current_value: value,
        })?;
    }
    Ok(())
}

fn handle_region_property_definition(
    context: &mut Context,
    mutation: RegionPropertyDefinitionMutation,
) -> Result<(), ContractError> {
    let RegionPropertyDefinitionMutation {
        property,
        definition,
        values,
    } = mutation;
    let manager = context.data_manager_mut::<RegionsDataManager>()?;
    if manager.definitions.contains_key(&property) {
        return Err(ContractError::with_details(
            ContractErrorKind::DuplicatePropertyDefinition,
            &property,
        ));
    }
    definition.validate()?;
    let mut container = PropertyValueContainer::for_definition(&definition)?;
    for (&region, value) in &values {
        manager.validate_region(region)?;
        definition.check_value(value)?;
        container.set(region.index(), value)?;
    }
    if !definition.has_default()
        && let Some(region) = manager
            .regions
            .iter()
            .find(|region| !values.contains_key(*region))
    {
        return Err(ContractError::with_details(
            ContractErrorKind::InsufficientDefaultCoverage,
            format!("{property} has no default and no value for {region}"),
        ));
    }
    manager.property_values.insert(property.clone(), container);
    manager.definitions.insert(property.clone(), definition);
    debug!(%property, "Region property defined");

    if context.subscribers_exist::<RegionPropertyDefinitionEvent>() {
        context.release_observation(RegionPropertyDefinitionEvent { property })?;
    }
    Ok(())
}
