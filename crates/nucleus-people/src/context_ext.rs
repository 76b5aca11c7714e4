//! People operations as methods on [`Context`].

use nucleus_core::Context;
use nucleus_types::{ContractError, PersonId};

use crate::construction::PersonConstructionData;
use crate::events::{PersonAdditionMutation, PersonRemovalMutation};
use crate::manager::PeopleDataManager;

/// Adds, removes, and queries people.
pub trait ContextPeopleExt {
    /// Add a person and return its id.
    ///
    /// Dependent plugins see a `PersonImminentAdditionEvent` carrying
    /// `construction` before the addition completes.
    ///
    /// # Errors
    ///
    /// Returns whatever a dependent plugin rejects the addition with, for
    /// example `MissingConstructionData`. The person is not added then.
    fn add_person(
        &mut self,
        construction: PersonConstructionData,
    ) -> Result<PersonId, ContractError>;

    /// Remove an existing person.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPersonId` if the person does not exist.
    fn remove_person(&mut self, person: PersonId) -> Result<(), ContractError>;

    /// Whether `person` currently exists.
    ///
    /// # Errors
    ///
    /// Fails only if the people plugin is not loaded.
    fn person_exists(&self, person: PersonId) -> Result<bool, ContractError>;

    /// Number of people that currently exist.
    ///
    /// # Errors
    ///
    /// Fails only if the people plugin is not loaded.
    fn population_count(&self) -> Result<usize, ContractError>;
}

impl ContextPeopleExt for Context {
    fn add_person(
        &mut self,
        construction: PersonConstructionData,
    ) -> Result<PersonId, ContractError> {
        let person = self.data_manager::<PeopleDataManager>()?.next_person_id();
        self.release_mutation(PersonAdditionMutation { construction })?;
        Ok(person)
    }

    fn remove_person(&mut self, person: PersonId) -> Result<(), ContractError> {
        self.release_mutation(PersonRemovalMutation { person })
    }

    fn person_exists(&self, person: PersonId) -> Result<bool, ContractError> {
        Ok(self.data_manager::<PeopleDataManager>()?.person_exists(person))
    }

    fn population_count(&self) -> Result<usize, ContractError> {
        Ok(self.data_manager::<PeopleDataManager>()?.population_count())
    }
}
