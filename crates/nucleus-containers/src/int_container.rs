//! Self-widening integer storage.
//!
//! An [`IntValueContainer`] starts out storing one byte per slot and widens
//! the whole backing array (byte -> short -> int -> long) the first time a
//! value outside the current width is written. Promotion is monotonic: the
//! container never demotes, even if every wide value is later overwritten.
//!
//! # Design Principles
//!
//! - Reads through an accessor narrower than the current width fail with
//!   [`ContainerError::NarrowingAccess`], whether or not the value would fit.
//! - Increments and decrements use checked arithmetic *at the accessor's
//!   width* and never wrap. A failed update leaves the slot unchanged.
//! - Unwritten slots read as the default value at every width.

use tracing::trace;

use crate::error::ContainerError;

/// Storage width of an [`IntValueContainer`].
///
/// Ordered from narrowest to widest, so `Byte < Short < Int < Long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntValueType {
    /// 8-bit signed storage.
    Byte,
    /// 16-bit signed storage.
    Short,
    /// 32-bit signed storage.
    Int,
    /// 64-bit signed storage.
    Long,
}

impl IntValueType {
    /// The narrowest width that can represent `value`.
    pub fn for_value(value: i64) -> Self {
        if i8::try_from(value).is_ok() {
            Self::Byte
        } else if i16::try_from(value).is_ok() {
            Self::Short
        } else if i32::try_from(value).is_ok() {
            Self::Int
        } else {
            Self::Long
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum IntStore {
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
}

/// Copy `source` into a wider element type, keeping the reserved capacity.
fn widen<S: Copy, T: From<S>>(source: &[S], capacity: usize) -> Vec<T> {
    let mut widened = Vec::with_capacity(capacity);
    widened.extend(source.iter().map(|&v| T::from(v)));
    widened
}

/// Write `value` at `index`, filling any gap with `fill`.
fn write_slot<T: Copy>(values: &mut Vec<T>, index: usize, value: T, fill: T) {
    if index >= values.len() {
        values.resize(index.saturating_add(1), fill);
    }
    if let Some(slot) = values.get_mut(index) {
        *slot = value;
    }
}

/// Generates a checked increment/decrement at a width narrower than `i64`.
macro_rules! int_arithmetic {
    (
        $(#[$meta:meta])*
        $name:ident, $getter:ident, $setter:ident, $ty:ty, $op:ident
    ) => {
        $(#[$meta])*
        ///
        /// # Errors
        ///
        /// Returns [`ContainerError::NarrowingAccess`] if the container is
        /// wider than this accessor, or [`ContainerError::ArithmeticOverflow`]
        /// if the result does not fit. The slot is unchanged on error.
        pub fn $name(&mut self, index: usize, amount: $ty) -> Result<(), ContainerError> {
            let current = self.$getter(index)?;
            let next = current
                .$op(amount)
                .ok_or(ContainerError::ArithmeticOverflow {
                    operation: stringify!($name),
                    index,
                })?;
            self.$setter(index, next);
            Ok(())
        }
    };
}

/// Index-addressed integer values with automatic width promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntValueContainer {
    store: IntStore,
    default_value: i64,
}

impl IntValueContainer {
    /// Create an empty container whose unwritten slots read as `default_value`.
    ///
    /// The initial width is the narrowest one that holds the default.
    pub fn new(default_value: i64) -> Self {
        Self::with_capacity(default_value, 0)
    }

    /// Create an empty container with room for `capacity` slots.
    pub fn with_capacity(default_value: i64, capacity: usize) -> Self {
        let store = match IntValueType::for_value(default_value) {
            IntValueType::Byte => IntStore::Byte(Vec::with_capacity(capacity)),
            IntValueType::Short => IntStore::Short(Vec::with_capacity(capacity)),
            IntValueType::Int => IntStore::Int(Vec::with_capacity(capacity)),
            IntValueType::Long => IntStore::Long(Vec::with_capacity(capacity)),
        };
        Self {
            store,
            default_value,
        }
    }

    /// The value returned for unwritten slots.
    pub const fn default_value(&self) -> i64 {
        self.default_value
    }

    /// The current storage width.
    pub const fn int_value_type(&self) -> IntValueType {
        match &self.store {
            IntStore::Byte(_) => IntValueType::Byte,
            IntStore::Short(_) => IntValueType::Short,
            IntStore::Int(_) => IntValueType::Int,
            IntStore::Long(_) => IntValueType::Long,
        }
    }

    /// One past the highest index ever written.
    pub fn len(&self) -> usize {
        match &self.store {
            IntStore::Byte(v) => v.len(),
            IntStore::Short(v) => v.len(),
            IntStore::Int(v) => v.len(),
            IntStore::Long(v) => v.len(),
        }
    }

    /// Whether no index has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots the backing store holds without reallocating.
    pub fn capacity(&self) -> usize {
        match &self.store {
            IntStore::Byte(v) => v.capacity(),
            IntStore::Short(v) => v.capacity(),
            IntStore::Int(v) => v.capacity(),
            IntStore::Long(v) => v.capacity(),
        }
    }

    /// Ensure the capacity is at least `capacity`. Never shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        let additional = capacity.saturating_sub(self.len());
        self.reserve(additional);
    }

    /// Reserve room for `additional` slots beyond the current length.
    pub fn expand_capacity(&mut self, additional: usize) {
        self.reserve(additional);
    }

    fn reserve(&mut self, additional: usize) {
        match &mut self.store {
            IntStore::Byte(v) => v.reserve(additional),
            IntStore::Short(v) => v.reserve(additional),
            IntStore::Int(v) => v.reserve(additional),
            IntStore::Long(v) => v.reserve(additional),
        }
    }

    fn check_width(&self, requested: IntValueType) -> Result<(), ContainerError> {
        let current = self.int_value_type();
        if current > requested {
            return Err(ContainerError::NarrowingAccess { requested, current });
        }
        Ok(())
    }

    /// Read a slot at full width. Never fails.
    pub fn get_long(&self, index: usize) -> i64 {
        match &self.store {
            IntStore::Byte(v) => v.get(index).map_or(self.default_value, |&x| i64::from(x)),
            IntStore::Short(v) => v.get(index).map_or(self.default_value, |&x| i64::from(x)),
            IntStore::Int(v) => v.get(index).map_or(self.default_value, |&x| i64::from(x)),
            IntStore::Long(v) => v.get(index).copied().unwrap_or(self.default_value),
        }
    }

    /// Read a slot as `i32`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NarrowingAccess`] if the container is `Long`.
    pub fn get_int(&self, index: usize) -> Result<i32, ContainerError> {
        self.check_width(IntValueType::Int)?;
        i32::try_from(self.get_long(index)).map_err(|_err| ContainerError::NarrowingAccess {
            requested: IntValueType::Int,
            current: self.int_value_type(),
        })
    }

    /// Read a slot as `i16`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NarrowingAccess`] if the container is wider
    /// than `Short`.
    pub fn get_short(&self, index: usize) -> Result<i16, ContainerError> {
        self.check_width(IntValueType::Short)?;
        i16::try_from(self.get_long(index)).map_err(|_err| ContainerError::NarrowingAccess {
            requested: IntValueType::Short,
            current: self.int_value_type(),
        })
    }

    /// Read a slot as `i8`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::NarrowingAccess`] if the container is wider
    /// than `Byte`.
    pub fn get_byte(&self, index: usize) -> Result<i8, ContainerError> {
        self.check_width(IntValueType::Byte)?;
        i8::try_from(self.get_long(index)).map_err(|_err| ContainerError::NarrowingAccess {
            requested: IntValueType::Byte,
            current: self.int_value_type(),
        })
    }

    /// Write a slot, widening the store first if `value` needs it.
    pub fn set_long(&mut self, index: usize, value: i64) {
        self.promote_to(IntValueType::for_value(value));
        let default = self.default_value;
        // After promotion both the value and the default fit the current width.
        match &mut self.store {
            IntStore::Byte(values) => {
                if let (Ok(v), Ok(d)) = (i8::try_from(value), i8::try_from(default)) {
                    write_slot(values, index, v, d);
                }
            }
            IntStore::Short(values) => {
                if let (Ok(v), Ok(d)) = (i16::try_from(value), i16::try_from(default)) {
                    write_slot(values, index, v, d);
                }
            }
            IntStore::Int(values) => {
                if let (Ok(v), Ok(d)) = (i32::try_from(value), i32::try_from(default)) {
                    write_slot(values, index, v, d);
                }
            }
            IntStore::Long(values) => write_slot(values, index, value, default),
        }
    }

    /// Write any integer that converts losslessly into `i64`.
    pub fn set(&mut self, index: usize, value: impl Into<i64>) {
        self.set_long(index, value.into());
    }

    /// Write an `i32` value.
    pub fn set_int(&mut self, index: usize, value: i32) {
        self.set_long(index, i64::from(value));
    }

    /// Write an `i16` value.
    pub fn set_short(&mut self, index: usize, value: i16) {
        self.set_long(index, i64::from(value));
    }

    /// Write an `i8` value.
    pub fn set_byte(&mut self, index: usize, value: i8) {
        self.set_long(index, i64::from(value));
    }

    int_arithmetic! {
        /// Add `amount` to a slot using `i8` arithmetic.
        increment_byte, get_byte, set_byte, i8, checked_add
    }

    int_arithmetic! {
        /// Subtract `amount` from a slot using `i8` arithmetic.
        decrement_byte, get_byte, set_byte, i8, checked_sub
    }

    int_arithmetic! {
        /// Add `amount` to a slot using `i16` arithmetic.
        increment_short, get_short, set_short, i16, checked_add
    }

    int_arithmetic! {
        /// Subtract `amount` from a slot using `i16` arithmetic.
        decrement_short, get_short, set_short, i16, checked_sub
    }

    int_arithmetic! {
        /// Add `amount` to a slot using `i32` arithmetic.
        increment_int, get_int, set_int, i32, checked_add
    }

    int_arithmetic! {
        /// Subtract `amount` from a slot using `i32` arithmetic.
        decrement_int, get_int, set_int, i32, checked_sub
    }

    /// Add `amount` to a slot using `i64` arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::ArithmeticOverflow`] if the sum exceeds
    /// `i64` range. The slot is unchanged on error.
    pub fn increment_long(&mut self, index: usize, amount: i64) -> Result<(), ContainerError> {
        let next = self
            .get_long(index)
            .checked_add(amount)
            .ok_or(ContainerError::ArithmeticOverflow {
                operation: "increment_long",
                index,
            })?;
        self.set_long(index, next);
        Ok(())
    }

    /// Subtract `amount` from a slot using `i64` arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::ArithmeticOverflow`] if the difference
    /// falls below `i64::MIN`. The slot is unchanged on error.
    pub fn decrement_long(&mut self, index: usize, amount: i64) -> Result<(), ContainerError> {
        let next = self
            .get_long(index)
            .checked_sub(amount)
            .ok_or(ContainerError::ArithmeticOverflow {
                operation: "decrement_long",
                index,
            })?;
        self.set_long(index, next);
        Ok(())
    }

    fn promote_to(&mut self, target: IntValueType) {
        let from = self.int_value_type();
        if target <= from {
            return;
        }
        while self.int_value_type() < target {
            self.promote_once();
        }
        trace!(?from, to = ?target, len = self.len(), "widened integer container");
    }

    fn promote_once(&mut self) {
        let widened = match &self.store {
            IntStore::Byte(v) => IntStore::Short(widen(v, v.capacity())),
            IntStore::Short(v) => IntStore::Int(widen(v, v.capacity())),
            IntStore::Int(v) => IntStore::Long(widen(v, v.capacity())),
            IntStore::Long(_) => return,
        };
        self.store = widened;
    }
}
