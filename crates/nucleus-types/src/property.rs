//! Property definitions: the static metadata governing one property.

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ContractErrorKind};
use crate::value::{PropertyValue, ValueType};

/// Static metadata for one property: its value type, optional default,
/// and whether values may change after first assignment.
///
/// A definition without a default obliges its owning manager to receive
/// an explicit value for every owner before initialization completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    value_type: ValueType,
    #[serde(default)]
    default_value: Option<PropertyValue>,
    #[serde(default = "default_mutable")]
    mutable: bool,
}

const fn default_mutable() -> bool {
    true
}

impl PropertyDefinition {
    /// Start building a definition for the given value type.
    pub const fn builder(value_type: ValueType) -> PropertyDefinitionBuilder {
        PropertyDefinitionBuilder {
            value_type,
            default_value: None,
            mutable: true,
        }
    }

    /// The value type every value must satisfy.
    pub const fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// The default value, if any.
    pub const fn default_value(&self) -> Option<&PropertyValue> {
        self.default_value.as_ref()
    }

    /// Whether a default exists.
    pub const fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    /// Whether values may be changed after assignment.
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Check that `value` is compatible with this definition.
    ///
    /// # Errors
    ///
    /// Returns [`ContractErrorKind::IncompatibleValue`] on a type mismatch.
    pub fn check_value(&self, value: &PropertyValue) -> Result<(), ContractError> {
        if self.value_type.accepts(value) {
            Ok(())
        } else {
            Err(ContractError::with_details(
                ContractErrorKind::IncompatibleValue,
                format!(
                    "{} value {value} for a {} property",
                    value.kind_name(),
                    self.value_type.name()
                ),
            ))
        }
    }

    /// Re-check invariants of a definition obtained by deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`ContractErrorKind::IncompatibleValue`] if the default does
    /// not match the value type, or [`ContractErrorKind::NotAnEnumeration`]
    /// for an enum type with no members.
    pub fn validate(&self) -> Result<(), ContractError> {
        if let ValueType::Enum(domain) = &self.value_type {
            if domain.is_empty() {
                return Err(ContractError::with_details(
                    ContractErrorKind::NotAnEnumeration,
                    &domain.name,
                ));
            }
        }
        if let Some(default) = &self.default_value {
            self.check_value(default)?;
        }
        Ok(())
    }
}

/// Builder for [`PropertyDefinition`].
#[derive(Debug, Clone)]
pub struct PropertyDefinitionBuilder {
    value_type: ValueType,
    default_value: Option<PropertyValue>,
    mutable: bool,
}

impl PropertyDefinitionBuilder {
    /// Set the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Mark values as immutable after first assignment.
    #[must_use]
    pub fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    /// Finish the definition.
    ///
    /// # Errors
    ///
    /// Fails if the default does not match the value type (see
    /// [`PropertyDefinition::validate`]).
    pub fn build(self) -> Result<PropertyDefinition, ContractError> {
        let definition = PropertyDefinition {
            value_type: self.value_type,
            default_value: self.default_value,
            mutable: self.mutable,
        };
        definition.validate()?;
        Ok(definition)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::value::EnumDomain;

    #[test]
    fn builder_rejects_mismatched_default() {
        let result = PropertyDefinition::builder(ValueType::Int)
            .default_value(1.5)
            .build();
        assert_eq!(
            result.map_err(|e| e.kind()),
            Err(ContractErrorKind::IncompatibleValue)
        );
    }

    #[test]
    fn builder_rejects_empty_enum() {
        let empty = EnumDomain::new("nothing", Vec::<String>::new());
        let result = PropertyDefinition::builder(ValueType::Enum(empty)).build();
        assert_eq!(
            result.map_err(|e| e.kind()),
            Err(ContractErrorKind::NotAnEnumeration)
        );
    }

    #[test]
    fn defaults_and_mutability() {
        let def = PropertyDefinition::builder(ValueType::Boolean)
            .default_value(true)
            .immutable()
            .build()
            .unwrap();
        assert!(def.has_default());
        assert!(!def.is_mutable());
        assert_eq!(def.default_value(), Some(&PropertyValue::Boolean(true)));
        assert!(def.check_value(&PropertyValue::Boolean(false)).is_ok());
        assert!(def.check_value(&PropertyValue::Int(0)).is_err());
    }

    #[test]
    fn deserialized_definition_defaults_to_mutable() {
        let def: PropertyDefinition =
            serde_json::from_str(r#"{"value_type":"Double"}"#).unwrap();
        assert!(def.is_mutable());
        assert!(!def.has_default());
    }
}
