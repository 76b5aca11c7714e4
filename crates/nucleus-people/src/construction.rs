//! Auxiliary data attached to a person addition.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Typed values that other plugins need to set up a new person.
///
/// Each plugin reads the values it understands, keyed by type. The regions
/// plugin, for example, requires a `RegionId`. At most one value of each
/// type is held; adding a second replaces the first.
#[derive(Clone, Default)]
pub struct PersonConstructionData {
    values: HashMap<TypeId, Rc<dyn Any>>,
}

impl PersonConstructionData {
    /// Empty construction data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a value.
    #[must_use]
    pub fn with_value<T: Any>(mut self, value: T) -> Self {
        self.add_value(value);
        self
    }

    /// Attach a value in place.
    pub fn add_value<T: Any>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Rc::new(value));
    }

    /// The value of type `T`, if one was attached.
    pub fn value<T: Any>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Number of attached values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are attached.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for PersonConstructionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonConstructionData")
            .field("values", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use nucleus_types::RegionId;

    use super::*;

    #[test]
    fn values_are_keyed_by_type() {
        let data = PersonConstructionData::new()
            .with_value(RegionId::new(3))
            .with_value(7_u32)
            .with_value(RegionId::new(4));
        assert_eq!(data.value::<RegionId>(), Some(&RegionId::new(4)));
        assert_eq!(data.value::<u32>(), Some(&7));
        assert_eq!(data.value::<String>(), None);
        assert_eq!(data.len(), 2);
    }
}
