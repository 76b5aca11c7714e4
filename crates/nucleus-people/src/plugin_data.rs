//! Initial population description.

use std::collections::BTreeSet;

use nucleus_types::{ContractError, ContractErrorKind, PersonId};
use serde::{Deserialize, Serialize};

/// The people that exist when the simulation starts.
///
/// People `P0 .. P{person_count - 1}` are created, except those listed in
/// `removed`, whose ids stay reserved so later ids are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeoplePluginData {
    /// Number of person ids allocated at start.
    #[serde(default)]
    pub person_count: usize,

    /// Allocated ids that do not exist.
    #[serde(default)]
    pub removed: BTreeSet<PersonId>,
}

impl PeoplePluginData {
    /// Data for `person_count` people, none removed.
    pub const fn with_person_count(person_count: usize) -> Self {
        Self {
            person_count,
            removed: BTreeSet::new(),
        }
    }

    /// Check that every removed id lies inside the allocated range.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPersonId` naming the first out-of-range id.
    pub fn validate(&self) -> Result<(), ContractError> {
        match self.removed.iter().find(|id| id.index() >= self.person_count) {
            Some(id) => Err(ContractError::with_details(
                ContractErrorKind::UnknownPersonId,
                format!("{id} is beyond person_count {}", self.person_count),
            )),
            None => Ok(()),
        }
    }

    /// Ids of the people that exist at start, ascending.
    pub fn existing_people(&self) -> impl Iterator<Item = PersonId> + '_ {
        (0..self.person_count)
            .map(PersonId::new)
            .filter(|id| !self.removed.contains(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn existing_people_skip_removed() {
        let mut data = PeoplePluginData::with_person_count(4);
        data.removed.insert(PersonId::new(1));
        let ids: Vec<usize> = data.existing_people().map(PersonId::index).collect();
        assert_eq!(ids, vec![0, 2, 3]);
        data.validate().unwrap();
    }

    #[test]
    fn removed_beyond_count_is_rejected() {
        let mut data = PeoplePluginData::with_person_count(2);
        data.removed.insert(PersonId::new(2));
        assert_eq!(
            data.validate().unwrap_err().kind(),
            ContractErrorKind::UnknownPersonId
        );
    }

    #[test]
    fn missing_fields_default() {
        let data: PeoplePluginData = serde_json::from_str(r#"{"person_count": 3}"#).unwrap();
        assert_eq!(data, PeoplePluginData::with_person_count(3));
    }
}
