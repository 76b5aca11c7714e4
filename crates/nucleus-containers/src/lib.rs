//! Compact, auto-growing value containers for per-entity properties.
//!
//! Each container stores one property across every owner (person, region,
//! ...) indexed by the owner's dense index. Containers grow to the highest
//! index written and return a default for slots nobody has touched.
//!
//! # Modules
//!
//! - [`int_container`] -- [`IntValueContainer`] with byte -> long width promotion
//! - [`boolean_container`] -- Bit-packed [`BooleanContainer`]
//! - [`dense_container`] -- [`DoubleValueContainer`] and [`FloatValueContainer`]
//! - [`enum_container`] -- [`EnumContainer`] storing member ordinals
//! - [`object_container`] -- [`ObjectValueContainer`] for owned values and nulls
//! - [`property_container`] -- [`PropertyValueContainer`], one per property definition
//! - [`error`] -- [`ContainerError`]

pub mod boolean_container;
pub mod dense_container;
pub mod enum_container;
pub mod error;
pub mod int_container;
pub mod object_container;
pub mod property_container;

pub use boolean_container::BooleanContainer;
pub use dense_container::{DenseValueContainer, DoubleValueContainer, FloatValueContainer};
pub use enum_container::EnumContainer;
pub use error::ContainerError;
pub use int_container::{IntValueContainer, IntValueType};
pub use object_container::ObjectValueContainer;
pub use property_container::PropertyValueContainer;
