//! Shared type definitions for the Nucleus simulation kernel.
//!
//! Every crate in the workspace speaks in these types: dense entity
//! identifiers, the closed set of property values, property definitions,
//! and the contract violation error raised when a precondition is broken.
//!
//! # Modules
//!
//! - [`ids`] -- Dense index identifiers for people and regions, plus property ids
//! - [`value`] -- [`PropertyValue`], [`ValueType`], and [`EnumDomain`]
//! - [`property`] -- [`PropertyDefinition`] and its builder
//! - [`error`] -- [`ContractError`] and [`ContractErrorKind`]

pub mod error;
pub mod ids;
pub mod property;
pub mod value;

pub use error::{ContractError, ContractErrorKind};
pub use ids::{PersonId, PropertyId, RegionId};
pub use property::{PropertyDefinition, PropertyDefinitionBuilder};
pub use value::{EnumDomain, PropertyValue, ValueType};
