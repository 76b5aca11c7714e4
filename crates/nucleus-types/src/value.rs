//! Closed set of property value types.
//!
//! Every property value in the simulation is one of the variants of
//! [`PropertyValue`]. A [`ValueType`] names the variant a property
//! accepts, and is checked once per write instead of at every read site.

use serde::{Deserialize, Serialize};

/// A named, ordered set of enumeration members.
///
/// Members are addressed by name at the API surface and stored by ordinal
/// (position in `members`) inside value containers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumDomain {
    /// Human-readable name of the enumeration.
    pub name: String,
    /// Member names in ordinal order.
    pub members: Vec<String>,
}

impl EnumDomain {
    /// Create an enumeration domain from a name and its members.
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Return the ordinal of a member, if it belongs to this domain.
    pub fn ordinal_of(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }

    /// Return the member name at an ordinal.
    pub fn member(&self, ordinal: usize) -> Option<&str> {
        self.members.get(ordinal).map(String::as_str)
    }

    /// Whether `member` is one of this domain's members.
    pub fn contains(&self, member: &str) -> bool {
        self.ordinal_of(member).is_some()
    }

    /// Number of members in the domain.
    pub const fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the domain has no members (and so is not a usable enumeration).
    pub const fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The static type of a property's values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// `true` / `false`.
    Boolean,
    /// Signed integer up to 64 bits.
    Int,
    /// 64-bit floating point.
    Double,
    /// 32-bit floating point.
    Float,
    /// A member of the given enumeration.
    Enum(EnumDomain),
    /// Free-form text.
    Text,
    /// Opaque byte payload.
    Blob,
}

impl ValueType {
    /// Whether `value` is an acceptable value of this type.
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        match (self, value) {
            (Self::Boolean, PropertyValue::Boolean(_))
            | (Self::Int, PropertyValue::Int(_))
            | (Self::Double, PropertyValue::Double(_))
            | (Self::Float, PropertyValue::Float(_))
            | (Self::Text, PropertyValue::Text(_))
            | (Self::Blob, PropertyValue::Blob(_)) => true,
            (Self::Enum(domain), PropertyValue::Enum(member)) => domain.contains(member),
            _ => false,
        }
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Double => "double",
            Self::Float => "float",
            Self::Enum(domain) => &domain.name,
            Self::Text => "text",
            Self::Blob => "blob",
        }
    }
}

/// A single property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Double(f64),
    /// Single-precision floating point value.
    Float(f32),
    /// Enumeration member, by name.
    Enum(String),
    /// Text value.
    Text(String),
    /// Opaque bytes.
    Blob(Vec<u8>),
}

impl PropertyValue {
    /// Short name of the variant, used in diagnostics.
    pub const fn kind_name(&self) -> &'static str {
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
}

impl core::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Enum(v) | Self::Text(v) => f.write_str(v),
            Self::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}
