//! Enumeration storage backed by member ordinals.

use nucleus_types::{EnumDomain, PropertyValue};

use crate::error::ContainerError;
use crate::int_container::IntValueContainer;

/// Index-addressed enumeration members.
///
/// Members are stored as ordinals in an [`IntValueContainer`], so a domain
/// with fewer than 128 members costs one byte per slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumContainer {
    domain: EnumDomain,
    ordinals: IntValueContainer,
    default_ordinal: usize,
}

impl EnumContainer {
    /// Create a container for `domain` whose unwritten slots read as `default_member`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotAnEnumeration`] if the domain has no
    /// members, or [`ContainerError::NotAMember`] if the default is not one
    /// of them.
    pub fn new(domain: EnumDomain, default_member: &str) -> Result<Self, ContainerError> {
        if domain.is_empty() {
            return Err(ContainerError::NotAnEnumeration {
                domain: domain.name,
            });
        }
        let default_ordinal =
            domain
                .ordinal_of(default_member)
                .ok_or_else(|| ContainerError::NotAMember {
                    domain: domain.name.clone(),
                    member: default_member.to_owned(),
                })?;
        let default_long = ordinal_to_long(default_ordinal, &domain)?;
        Ok(Self {
            domain,
            ordinals: IntValueContainer::new(default_long),
            default_ordinal,
        })
    }

    /// The enumeration this container stores.
    pub const fn domain(&self) -> &EnumDomain {
        &self.domain
    }

    /// The member returned for unwritten slots.
    pub fn default_member(&self) -> &str {
        self.domain.member(self.default_ordinal).unwrap_or_default()
    }

    /// Read the ordinal stored at a slot.
    pub fn get_ordinal(&self, index: usize) -> usize {
        usize::try_from(self.ordinals.get_long(index)).unwrap_or(self.default_ordinal)
    }

    /// Read the member stored at a slot.
    pub fn get(&self, index: usize) -> &str {
        self.domain
            .member(self.get_ordinal(index))
            .unwrap_or_else(|| self.default_member())
    }

    /// Write a member to a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotAMember`] if `member` does not belong to
    /// the domain. The slot is unchanged on error.
    pub fn set(&mut self, index: usize, member: &str) -> Result<(), ContainerError> {
        let ordinal = self
            .domain
            .ordinal_of(member)
            .ok_or_else(|| ContainerError::NotAMember {
                domain: self.domain.name.clone(),
                member: member.to_owned(),
            })?;
        let stored = ordinal_to_long(ordinal, &self.domain)?;
        self.ordinals.set_long(index, stored);
        Ok(())
    }

    /// Write an enumeration [`PropertyValue`] to a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::IncompatibleValue`] for any non-enum value,
    /// otherwise as [`EnumContainer::set`].
    pub fn set_value(&mut self, index: usize, value: &PropertyValue) -> Result<(), ContainerError> {
        match value {
            PropertyValue::Enum(member) => self.set(index, member),
            other => Err(ContainerError::IncompatibleValue {
                expected: format!("enum {}", self.domain.name),
                found: other.kind_name(),
            }),
        }
    }

    /// One past the highest index ever written.
    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    /// Whether no index has been written.
    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }

    /// Number of slots held without reallocating.
    pub fn capacity(&self) -> usize {
        self.ordinals.capacity()
    }

    /// Ensure the capacity is at least `capacity`. Never shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.ordinals.set_capacity(capacity);
    }

    /// Reserve room for `additional` slots beyond the current length.
    pub fn expand_capacity(&mut self, additional: usize) {
        self.ordinals.expand_capacity(additional);
    }
}

fn ordinal_to_long(ordinal: usize, domain: &EnumDomain) -> Result<i64, ContainerError> {
    i64::try_from(ordinal).map_err(|_err| ContainerError::NotAMember {
        domain: domain.name.clone(),
        member: ordinal.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::int_container::IntValueType;

    fn season() -> EnumDomain {
        EnumDomain::new("season", ["spring", "summer", "autumn", "winter"])
    }

    #[test]
    fn construction_validates_domain_and_default() {
        let empty = EnumDomain::new("empty", Vec::<String>::new());
        assert!(matches!(
            EnumContainer::new(empty, "x"),
            Err(ContainerError::NotAnEnumeration { .. })
        ));
        assert!(matches!(
            EnumContainer::new(season(), "monsoon"),
            Err(ContainerError::NotAMember { .. })
        ));
    }

    #[test]
    fn set_rejects_non_members() {
        let mut container = EnumContainer::new(season(), "spring").unwrap();
        container.set(2, "winter").unwrap();
        let err = container.set(2, "monsoon").unwrap_err();
        assert_eq!(
            err,
            ContainerError::NotAMember {
                domain: "season".to_owned(),
                member: "monsoon".to_owned(),
            }
        );
        assert_eq!(container.get(2), "winter");
        assert_eq!(container.get(0), "spring");
        assert_eq!(container.get(1_000), "spring");
        assert_eq!(container.get_ordinal(2), 3);
    }

    #[test]
    fn set_value_rejects_non_enum_values() {
        let mut container = EnumContainer::new(season(), "spring").unwrap();
        container
            .set_value(0, &PropertyValue::Enum("summer".to_owned()))
            .unwrap();
        assert!(matches!(
            container.set_value(0, &PropertyValue::Int(1)),
            Err(ContainerError::IncompatibleValue { found: "int", .. })
        ));
        assert_eq!(container.get(0), "summer");
    }

    #[test]
    fn ordinals_stay_byte_wide_for_small_domains() {
        let mut container = EnumContainer::new(season(), "autumn").unwrap();
        container.set(10, "summer").unwrap();
        assert_eq!(container.ordinals.int_value_type(), IntValueType::Byte);
        container.set_capacity(128);
        assert!(container.capacity() >= 128);
        assert_eq!(container.len(), 11);
    }
}
