//! Type-safe identifier wrappers for simulation entities.
//!
//! Entities are addressed by dense, non-negative indices so that every
//! per-entity property can live in an index-addressed value container.
//! Each kind of entity gets its own newtype to prevent accidental mixing
//! of identifiers at compile time.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a dense `usize` index with standard derives.
macro_rules! define_index_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Create an identifier from its raw index.
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Return the raw index backing this identifier.
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_index_id! {
    /// Identifier for a person (the canonical agent-like entity).
    ///
    /// Person ids are assigned densely, in order of addition, starting at 0.
    PersonId, "P"
}

define_index_id! {
    /// Identifier for a region chosen by the scenario author.
    ///
    /// Region ids need not be dense; region-indexed containers simply
    /// leave unused slots at their default.
    RegionId, "R"
}

/// Identifier for a property (a column of per-owner values).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl PropertyId {
    /// Create a property identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}
