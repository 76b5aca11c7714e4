//! Plain dense storage for fixed-width `Copy` values such as floats.

/// Index-addressed `Copy` values with a default for unwritten slots.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseValueContainer<T: Copy> {
    values: Vec<T>,
    default_value: T,
}

/// Dense 64-bit float storage.
pub type DoubleValueContainer = DenseValueContainer<f64>;

/// Dense 32-bit float storage.
pub type FloatValueContainer = DenseValueContainer<f32>;

impl<T: Copy> DenseValueContainer<T> {
    /// Create an empty container whose unwritten slots read as `default_value`.
    pub const fn new(default_value: T) -> Self {
        Self {
            values: Vec::new(),
            default_value,
        }
    }

    /// The value returned for unwritten slots.
    pub const fn default_value(&self) -> T {
        self.default_value
    }

    /// Read a slot.
    pub fn get(&self, index: usize) -> T {
        self.values.get(index).copied().unwrap_or(self.default_value)
    }

    /// Write a slot, default-filling any gap below it.
    pub fn set(&mut self, index: usize, value: T) {
        if index >= self.values.len() {
            self.values
                .resize(index.saturating_add(1), self.default_value);
        }
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// One past the highest index ever written.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no index has been written.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of slots held without reallocating.
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Ensure the capacity is at least `capacity`. Never shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.values
            .reserve(capacity.saturating_sub(self.values.len()));
    }

    /// Reserve room for `additional` slots beyond the current length.
    pub fn expand_capacity(&mut self, additional: usize) {
        self.values.reserve(additional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn double_container_defaults_and_writes() {
        let mut container = DoubleValueContainer::new(1.5);
        assert_eq!(container.get(3), 1.5);
        container.set(3, -2.25);
        assert_eq!(container.get(3), -2.25);
        assert_eq!(container.get(2), 1.5);
        assert_eq!(container.len(), 4);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn float_container_capacity() {
        let mut container = FloatValueContainer::new(0.0);
        container.set(0, 3.0);
        container.set_capacity(256);
        assert!(container.capacity() >= 256);
        container.set_capacity(2);
        assert!(container.capacity() >= 256);
        assert_eq!(container.get(0), 3.0);
        container.expand_capacity(1_000);
        assert!(container.capacity() >= 1_001);
    }
}
