//! Storage for arbitrary owned values, including "no value".

/// Index-addressed `Option<T>` values with an optional default.
///
/// `None` is a legal stored value. Unwritten slots read as the default,
/// which may itself be `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValueContainer<T: Clone> {
    values: Vec<Option<T>>,
    default_value: Option<T>,
}

impl<T: Clone> ObjectValueContainer<T> {
    /// Create an empty container with the given default.
    pub const fn new(default_value: Option<T>) -> Self {
        Self {
            values: Vec::new(),
            default_value,
        }
    }

    /// The value returned for unwritten slots.
    pub const fn default_value(&self) -> Option<&T> {
        self.default_value.as_ref()
    }

    /// Read a slot.
    pub fn get(&self, index: usize) -> Option<&T> {
        match self.values.get(index) {
            Some(slot) => slot.as_ref(),
            None => self.default_value.as_ref(),
        }
    }

    /// Write a slot, default-filling any gap below it.
    pub fn set(&mut self, index: usize, value: Option<T>) {
        if index >= self.values.len() {
            self.values
                .resize(index.saturating_add(1), self.default_value.clone());
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
