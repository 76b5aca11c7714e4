//! Error types for the nucleus-containers crate.
//!
//! All container operations that can fail return [`ContainerError`]. The
//! kernel surfaces these as [`ContractError`]s through the `From`
//! conversion at the bottom of this module.

use nucleus_types::{ContractError, ContractErrorKind};

use crate::int_container::IntValueType;

/// Errors that can occur while reading or writing a value container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    /// An integer was read through an accessor narrower than the storage width.
    #[error("cannot read a {current:?} container as {requested:?}")]
    NarrowingAccess {
        /// Width of the requested accessor.
        requested: IntValueType,
        /// Current storage width.
        current: IntValueType,
    },

    /// Checked integer arithmetic failed at the requested width.
    #[error("arithmetic overflow in {operation} at index {index}")]
    ArithmeticOverflow {
        /// The operation that overflowed (e.g. `increment_int`).
        operation: &'static str,
        /// The index being updated.
        index: usize,
    },

    /// The index lies at or beyond the owner-supplied limit.
    #[error("index {index} is beyond the index limit {limit}")]
    IndexOutOfBounds {
        /// The rejected index.
        index: usize,
        /// The current limit (exclusive).
        limit: usize,
    },

    /// The enumeration domain has no members.
    #[error("enumeration {domain} has no members")]
    NotAnEnumeration {
        /// Name of the enumeration domain.
        domain: String,
    },

    /// The value is not a member of the enumeration.
    #[error("{member} is not a member of enumeration {domain}")]
    NotAMember {
        /// Name of the enumeration domain.
        domain: String,
        /// The rejected member name.
        member: String,
    },

    /// The value does not match the container's value type.
    #[error("{found} value is incompatible with a {expected} container")]
    IncompatibleValue {
        /// The value type the container stores.
        expected: String,
        /// The kind of value supplied.
        found: &'static str,
    },
}

impl ContainerError {
    /// The contract violation kind this error maps onto.
    pub const fn kind(&self) -> ContractErrorKind {
        match self {
            Self::NarrowingAccess { .. } => ContractErrorKind::NarrowingAccess,
            Self::ArithmeticOverflow { .. } => ContractErrorKind::ArithmeticOverflow,
            Self::IndexOutOfBounds { .. } => ContractErrorKind::IndexOutOfBounds,
            Self::NotAnEnumeration { .. } => ContractErrorKind::NotAnEnumeration,
            Self::NotAMember { .. } => ContractErrorKind::NotAMember,
            Self::IncompatibleValue { .. } => ContractErrorKind::IncompatibleValue,
        }
    }
}

impl From<ContainerError> for ContractError {
    fn from(err: ContainerError) -> Self {
        Self::with_details(err.kind(), &err)
    }
}
