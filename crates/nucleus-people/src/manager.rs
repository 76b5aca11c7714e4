//! The people data manager and its mutation handlers.

use nucleus_containers::BooleanContainer;
use nucleus_core::{ComponentId, Context, DataManager};
use nucleus_types::{ContractError, ContractErrorKind, PersonId};
use tracing::{debug, warn};

use crate::events::{
    PersonAdditionEvent, PersonAdditionMutation, PersonImminentAdditionEvent, PersonRemovalEvent,
    PersonRemovalMutation,
};
use crate::plugin_data::PeoplePluginData;

/// Owns person existence.
///
/// Person ids are allocated densely. A removed person's id is never reused,
/// but the id of a rejected addition is retracted and handed to the next
/// addition. Existence is a bit
/// per id in a [`BooleanContainer`] whose index limit tracks the number of
/// ids allocated, so asking about an id that was never handed out is an
/// error rather than a silent `false`.
#[derive(Debug)]
pub struct PeopleDataManager {
    plugin_data: PeoplePluginData,
    existence: BooleanContainer,
    next_index: usize,
    population: usize,
}

impl PeopleDataManager {
    /// A manager that will create the people described by `plugin_data`.
    pub const fn new(plugin_data: PeoplePluginData) -> Self {
        Self {
            plugin_data,
            existence: BooleanContainer::with_index_limit(false, 0),
            next_index: 0,
            population: 0,
        }
    }

    /// Whether `person` was allocated and not removed.
    pub fn person_exists(&self, person: PersonId) -> bool {
        self.existence.get(person.index()).unwrap_or(false)
    }

    /// Fail with `UnknownPersonId` unless `person` exists.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPersonId` if the person was never added or was removed.
    pub fn validate_person(&self, person: PersonId) -> Result<(), ContractError> {
        if self.person_exists(person) {
            Ok(())
        } else {
            Err(ContractError::with_details(
                ContractErrorKind::UnknownPersonId,
                person,
            ))
        }
    }

    /// Number of people that currently exist.
    pub const fn population_count(&self) -> usize {
        self.population
    }

    /// One past the highest person id ever allocated.
    pub const fn person_id_limit(&self) -> usize {
        self.next_index
    }

    /// The id the next addition will receive.
    pub const fn next_person_id(&self) -> PersonId {
        PersonId::new(self.next_index)
    }

    /// Every existing person, ascending.
    pub fn person_ids(&self) -> Vec<PersonId> {
        (0..self.next_index)
            .map(PersonId::new)
            .filter(|&id| self.person_exists(id))
            .collect()
    }

    /// Plugin data reproducing the current population.
    pub fn to_plugin_data(&self) -> PeoplePluginData {
        PeoplePluginData {
            person_count: self.next_index,
            removed: (0..self.next_index)
                .map(PersonId::new)
                .filter(|&id| !self.person_exists(id))
                .collect(),
        }
    }

    fn allocate(&mut self) -> Result<PersonId, ContractError> {
        let person = PersonId::new(self.next_index);
        let next = self.next_index.checked_add(1).ok_or_else(|| {
            ContractError::with_details(
                ContractErrorKind::ArithmeticOverflow,
                "person id space exhausted",
            )
        })?;
        self.existence.set_index_limit(next);
        self.existence.set(person.index(), true)?;
        self.next_index = next;
        self.population = self.population.saturating_add(1);
        Ok(person)
    }

    fn retract(&mut self, person: PersonId) -> Result<(), ContractError> {
        self.existence.set(person.index(), false)?;
        self.population = self.population.saturating_sub(1);
        if person.index().checked_add(1) == Some(self.next_index) {
            self.next_index = person.index();
            self.existence.set_index_limit(self.next_index);
        }
        Ok(())
    }

    fn remove(&mut self, person: PersonId) -> Result<(), ContractError> {
        self.validate_person(person)?;
        self.existence.set(person.index(), false)?;
        self.population = self.population.saturating_sub(1);
        Ok(())
    }
}

impl DataManager for PeopleDataManager {
    fn init(&mut self, context: &mut Context, id: ComponentId) -> Result<(), ContractError> {
        self.plugin_data.validate()?;
        let count = self.plugin_data.person_count;
        self.existence.set_index_limit(count);
        self.existence.set_capacity(count);
        for person in self.plugin_data.existing_people() {
            self.existence.set(person.index(), true)?;
            self.population = self.population.saturating_add(1);
        }
        self.next_index = count;

        context.register_mutation_handler(handle_person_addition)?;
        context.register_mutation_handler(handle_person_removal)?;
        debug!(component = %id, population = self.population, "People initialized");
        Ok(())
    }
}

fn handle_person_addition(
    context: &mut Context,
    mutation: PersonAdditionMutation,
) -> Result<(), ContractError> {
    let person = context.data_manager_mut::<PeopleDataManager>()?.allocate()?;

    let imminent = PersonImminentAdditionEvent {
        person,
        construction: mutation.construction,
    };
    if let Err(err) = context.release_observation(imminent) {
        warn!(%person, %err, "Person addition rejected, rolling back");
        context
            .data_manager_mut::<PeopleDataManager>()?
            .retract(person)?;
        return Err(err);
    }

    if context.subscribers_exist::<PersonAdditionEvent>() {
        context.release_observation(PersonAdditionEvent { person })?;
    }
    Ok(())
}

fn handle_person_removal(
    context: &mut Context,
    mutation: PersonRemovalMutation,
) -> Result<(), ContractError> {
    let person = mutation.person;
    context.data_manager_mut::<PeopleDataManager>()?.remove(person)?;
    if context.subscribers_exist::<PersonRemovalEvent>() {
        context.release_observation(PersonRemovalEvent { person })?;
    }
    Ok(())
}
