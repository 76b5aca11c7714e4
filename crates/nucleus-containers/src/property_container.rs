//! A single container type covering every [`ValueType`].
//!
//! Data managers hold one [`PropertyValueContainer`] per property. The
//! variant is picked once, from the property's definition, so reads and
//! writes dispatch on a closed enum rather than on runtime type checks at
//! each call site.

use nucleus_types::{PropertyDefinition, PropertyValue, ValueType};

use crate::boolean_container::BooleanContainer;
use crate::dense_container::{DoubleValueContainer, FloatValueContainer};
use crate::enum_container::EnumContainer;
use crate::error::ContainerError;
use crate::int_container::IntValueContainer;
use crate::object_container::ObjectValueContainer;

/// Per-owner storage for one property, specialized by value type.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValueContainer {
    /// Bit-dense booleans.
    Boolean(BooleanContainer),
    /// Self-widening integers.
    Int(IntValueContainer),
    /// Dense doubles.
    Double(DoubleValueContainer),
    /// Dense single-precision floats.
    Float(FloatValueContainer),
    /// Enumeration ordinals.
    Enum(EnumContainer),
    /// Boxed text values.
    Text(ObjectValueContainer<String>),
    /// Boxed byte payloads.
    Blob(ObjectValueContainer<Vec<u8>>),
}

impl PropertyValueContainer {
    /// Build the container matching a property definition.
    ///
    /// When the definition has no default, primitive containers fall back to
    /// a zero value and boxed containers to "no value". The owning manager
    /// is responsible for writing every owner before reads happen.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NotAnEnumeration`] for an empty enum domain,
    /// or [`ContainerError::IncompatibleValue`] if the default does not match
    /// the value type.
    pub fn for_definition(definition: &PropertyDefinition) -> Result<Self, ContainerError> {
        let default = definition.default_value();
        let value_type = definition.value_type();
        let mismatch = |found: &PropertyValue| ContainerError::IncompatibleValue {
            expected: value_type.name().to_owned(),
            found: found.kind_name(),
        };
        let container = match (value_type, default) {
            (ValueType::Boolean, None) => Self::Boolean(BooleanContainer::new(false)),
            (ValueType::Boolean, Some(PropertyValue::Boolean(v))) => {
                Self::Boolean(BooleanContainer::new(*v))
            }
            (ValueType::Int, None) => Self::Int(IntValueContainer::new(0)),
            (ValueType::Int, Some(PropertyValue::Int(v))) => Self::Int(IntValueContainer::new(*v)),
            (ValueType::Double, None) => Self::Double(DoubleValueContainer::new(0.0)),
            (ValueType::Double, Some(PropertyValue::Double(v))) => {
                Self::Double(DoubleValueContainer::new(*v))
            }
            (ValueType::Float, None) => Self::Float(FloatValueContainer::new(0.0)),
            (ValueType::Float, Some(PropertyValue::Float(v))) => {
                Self::Float(FloatValueContainer::new(*v))
            }
            (ValueType::Enum(domain), None) => {
                let first = domain.member(0).unwrap_or_default().to_owned();
                Self::Enum(EnumContainer::new(domain.clone(), &first)?)
            }
            (ValueType::Enum(domain), Some(PropertyValue::Enum(member))) => {
                Self::Enum(EnumContainer::new(domain.clone(), member)?)
            }
            (ValueType::Text, None) => Self::Text(ObjectValueContainer::new(None)),
            (ValueType::Text, Some(PropertyValue::Text(v))) => {
                Self::Text(ObjectValueContainer::new(Some(v.clone())))
            }
            (ValueType::Blob, None) => Self::Blob(ObjectValueContainer::new(None)),
            (ValueType::Blob, Some(PropertyValue::Blob(v))) => {
                Self::Blob(ObjectValueContainer::new(Some(v.clone())))
            }
            (_, Some(other)) => return Err(mismatch(other)),
        };
        Ok(container)
    }

    /// Read the value at a slot.
    ///
    /// Returns `Ok(None)` only for boxed containers holding no value.
    ///
    /// # Errors
    ///
    /// Propagates [`ContainerError::IndexOutOfBounds`] from a limited
    /// boolean container.
    pub fn get(&self, index: usize) -> Result<Option<PropertyValue>, ContainerError> {
        let value = match self {
            Self::Boolean(c) => Some(PropertyValue::Boolean(c.get(index)?)),
            Self::Int(c) => Some(PropertyValue::Int(c.get_long(index))),
            Self::Double(c) => Some(PropertyValue::Double(c.get(index))),
            Self::Float(c) => Some(PropertyValue::Float(c.get(index))),
            Self::Enum(c) => Some(PropertyValue::Enum(c.get(index).to_owned())),
            Self::Text(c) => c.get(index).cloned().map(PropertyValue::Text),
            Self::Blob(c) => c.get(index).cloned().map(PropertyValue::Blob),
        };
        Ok(value)
    }

    /// Write a value to a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::IncompatibleValue`] if the value's variant
    /// does not match the container, or [`ContainerError::NotAMember`] for
    /// a foreign enum member. The slot is unchanged on error.
    pub fn set(&mut self, index: usize, value: &PropertyValue) -> Result<(), ContainerError> {
        match (&mut *self, value) {
            (Self::Boolean(c), PropertyValue::Boolean(v)) => c.set(index, *v),
            (Self::Int(c), PropertyValue::Int(v)) => {
                c.set_long(index, *v);
                Ok(())
            }
            (Self::Double(c), PropertyValue::Double(v)) => {
                c.set(index, *v);
                Ok(())
            }
            (Self::Float(c), PropertyValue::Float(v)) => {
                c.set(index, *v);
                Ok(())
            }
            (Self::Enum(c), PropertyValue::Enum(_)) => c.set_value(index, value),
            (Self::Text(c), PropertyValue::Text(v)) => {
                c.set(index, Some(v.clone()));
                Ok(())
            }
            (Self::Blob(c), PropertyValue::Blob(v)) => {
                c.set(index, Some(v.clone()));
                Ok(())
            }
            (container, other) => Err(ContainerError::IncompatibleValue {
                expected: container.type_name().to_owned(),
                found: other.kind_name(),
            }),
        }
    }

    /// Short name of the stored value type.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::Float(_) => "float",
            Self::Enum(_) => "enum",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    /// One past the highest index ever written.
    pub fn len(&self) -> usize {
        match self {
            Self::Boolean(c) => c.len(),
            Self::Int(c) => c.len(),
            Self::Double(c) => c.len(),
            Self::Float(c) => c.len(),
            Self::Enum(c) => c.len(),
            Self::Text(c) => c.len(),
            Self::Blob(c) => c.len(),
        }
    }

    /// Whether no index has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots held without reallocating.
    pub fn capacity(&self) -> usize {
        match self {
            Self::Boolean(c) => c.capacity(),
            Self::Int(c) => c.capacity(),
            Self::Double(c) => c.capacity(),
            Self::Float(c) => c.capacity(),
            Self::Enum(c) => c.capacity(),
            Self::Text(c) => c.capacity(),
            Self::Blob(c) => c.capacity(),
        }
    }

    /// Ensure the capacity is at least `capacity`. Never shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        match self {
            Self::Boolean(c) => c.set_capacity(capacity),
            Self::Int(c) => c.set_capacity(capacity),
            Self::Double(c) => c.set_capacity(capacity),
            Self::Float(c) => c.set_capacity(capacity),
            Self::Enum(c) => c.set_capacity(capacity),
            Self::Text(c) => c.set_capacity(capacity),
            Self::Blob(c) => c.set_capacity(capacity),
        }
    }

    /// Reserve room for `additional` slots beyond the current length.
    pub fn expand_capacity(&mut self, additional: usize) {
        match self {
            Self::Boolean(c) => c.expand_capacity(additional),
            Self::Int(c) => c.expand_capacity(additional),
            Self::Double(c) => c.expand_capacity(additional),
            Self::Float(c) => c.expand_capacity(additional),
            Self::Enum(c) => c.expand_capacity(additional),
            Self::Text(c) => c.expand_capacity(additional),
            Self::Blob(c) => c.expand_capacity(additional),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nucleus_types::EnumDomain;

    use super::*;

    fn definition(value_type: ValueType, default: Option<PropertyValue>) -> PropertyDefinition {
        let mut builder = PropertyDefinition::builder(value_type);
        if let Some(default) = default {
            builder = builder.default_value(default);
        }
        builder.build().unwrap()
    }

    #[test]
    fn picks_variant_from_definition() {
        let int = definition(ValueType::Int, Some(PropertyValue::Int(3)));
        let container = PropertyValueContainer::for_definition(&int).unwrap();
        assert_eq!(container.type_name(), "int");
        assert_eq!(container.get(9).unwrap(), Some(PropertyValue::Int(3)));

        let text = definition(ValueType::Text, None);
        let container = PropertyValueContainer::for_definition(&text).unwrap();
        assert_eq!(container.get(0).unwrap(), None);
    }

    #[test]
    fn set_get_roundtrip_per_type() {
        let domain = EnumDomain::new("terrain", ["plain", "hill"]);
        let cases = [
            (ValueType::Boolean, PropertyValue::Boolean(true)),
            (ValueType::Int, PropertyValue::Int(-40_000)),
            (ValueType::Double, PropertyValue::Double(2.5)),
            (ValueType::Float, PropertyValue::Float(-0.75)),
            (ValueType::Enum(domain), PropertyValue::Enum("hill".to_owned())),
            (ValueType::Text, PropertyValue::Text("coastal".to_owned())),
            (ValueType::Blob, PropertyValue::Blob(vec![7, 8, 9])),
        ];
        for (value_type, value) in cases {
            let def = definition(value_type, None);
            let mut container = PropertyValueContainer::for_definition(&def).unwrap();
            container.set(4, &value).unwrap();
            assert_eq!(container.get(4).unwrap(), Some(value));
            assert_eq!(container.len(), 5);
        }
    }

    #[test]
    fn rejects_incompatible_values() {
        let def = definition(ValueType::Double, None);
        let mut container = PropertyValueContainer::for_definition(&def).unwrap();
        let err = container.set(0, &PropertyValue::Int(1)).unwrap_err();
        assert_eq!(
            err,
            ContainerError::IncompatibleValue {
                expected: "double".to_owned(),
                found: "int",
            }
        );
        assert!(container.is_empty());
    }

    #[test]
    fn float_definition_uses_single_precision_storage() {
        let def = definition(ValueType::Float, Some(PropertyValue::Float(1.5)));
        let mut container = PropertyValueContainer::for_definition(&def).unwrap();
        assert!(matches!(container, PropertyValueContainer::Float(_)));
        assert_eq!(container.get(7).unwrap(), Some(PropertyValue::Float(1.5)));
        let err = container.set(0, &PropertyValue::Double(1.5)).unwrap_err();
        assert_eq!(
            err,
            ContainerError::IncompatibleValue {
                expected: "float".to_owned(),
                found: "double",
            }
        );
    }

    #[test]
    fn enum_without_default_uses_first_member() {
        let domain = EnumDomain::new("terrain", ["plain", "hill"]);
        let def = definition(ValueType::Enum(domain), None);
        let container = PropertyValueContainer::for_definition(&def).unwrap();
        assert_eq!(
            container.get(0).unwrap(),
            Some(PropertyValue::Enum("plain".to_owned()))
        );
    }

    #[test]
    fn capacity_passthrough() {
        let def = definition(ValueType::Boolean, Some(PropertyValue::Boolean(false)));
        let mut container = PropertyValueContainer::for_definition(&def).unwrap();
        container.set_capacity(300);
        assert!(container.capacity() >= 300);
        container.expand_capacity(1_000);
        assert!(container.capacity() >= 1_000);
    }
}
