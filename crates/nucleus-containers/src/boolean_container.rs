//! Bit-dense boolean storage.
//!
//! Bits are packed 64 to a word. Every bit at or beyond the logical length
//! holds the default value, so growth only has to append default-filled
//! words.

use crate::error::ContainerError;

const BITS_PER_WORD: usize = 64;

/// Index-addressed boolean values packed into `u64` words.
///
/// An owner may attach an index limit (for example the current population
/// size); any access at or beyond the limit fails with
/// [`ContainerError::IndexOutOfBounds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanContainer {
    words: Vec<u64>,
    len: usize,
    default_value: bool,
    index_limit: Option<usize>,
}

impl BooleanContainer {
    /// Create an unlimited container whose unwritten slots read as `default_value`.
    pub const fn new(default_value: bool) -> Self {
        Self {
            words: Vec::new(),
            len: 0,
            default_value,
            index_limit: None,
        }
    }

    /// Create a container that rejects indices at or beyond `limit`.
    pub const fn with_index_limit(default_value: bool, limit: usize) -> Self {
        Self {
            words: Vec::new(),
            len: 0,
            default_value,
            index_limit: Some(limit),
        }
    }

    /// Replace the index limit. The owner calls this as its population grows.
    pub const fn set_index_limit(&mut self, limit: usize) {
        self.index_limit = Some(limit);
    }

    /// The current index limit, if any.
    pub const fn index_limit(&self) -> Option<usize> {
        self.index_limit
    }

    /// The value returned for unwritten slots.
    pub const fn default_value(&self) -> bool {
        self.default_value
    }

    /// One past the highest index ever written.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no index has been written.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots the backing words hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.words.capacity().saturating_mul(BITS_PER_WORD)
    }

    /// Ensure the capacity is at least `capacity` bits. Never shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        let words_needed = capacity.div_ceil(BITS_PER_WORD);
        self.words
            .reserve(words_needed.saturating_sub(self.words.len()));
    }

    /// Reserve room for `additional` bits beyond the current length.
    pub fn expand_capacity(&mut self, additional: usize) {
        self.set_capacity(self.len.saturating_add(additional));
    }

    fn check_index(&self, index: usize) -> Result<(), ContainerError> {
        match self.index_limit {
            Some(limit) if index >= limit => Err(ContainerError::IndexOutOfBounds { index, limit }),
            _ => Ok(()),
        }
    }

    /// Read a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::IndexOutOfBounds`] if `index` is at or
    /// beyond the index limit.
    pub fn get(&self, index: usize) -> Result<bool, ContainerError> {
        self.check_index(index)?;
        let word = index / BITS_PER_WORD;
        let bit = index % BITS_PER_WORD;
        Ok(self
            .words
            .get(word)
            .map_or(self.default_value, |w| (w >> bit) & 1 == 1))
    }

    /// Write a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::IndexOutOfBounds`] if `index` is at or
    /// beyond the index limit.
    pub fn set(&mut self, index: usize, value: bool) -> Result<(), ContainerError> {
        self.check_index(index)?;
        let word = index / BITS_PER_WORD;
        let bit = index % BITS_PER_WORD;
        if word >= self.words.len() {
            let fill = if self.default_value { u64::MAX } else { 0 };
            self.words.resize(word.saturating_add(1), fill);
        }
        if let Some(w) = self.words.get_mut(word) {
            if value {
                *w |= 1 << bit;
            } else {
                *w &= !(1 << bit);
            }
        }
        self.len = self.len.max(index.saturating_add(1));
        Ok(())
    }

    /// Count the `true` slots below `len()`.
    pub fn count_true(&self) -> usize {
        let full_words = self.len / BITS_PER_WORD;
        let tail_bits = self.len % BITS_PER_WORD;
        // Default-filled bits past `len()` in the last word are not slots.
        let tail_mask = if tail_bits == 0 {
            0
        } else {
            !(u64::MAX << tail_bits)
        };
        self.words
            .iter()
            .take(full_words)
            .map(|word| word.count_ones())
            .chain(
                self.words
                    .get(full_words)
                    .map(|word| (word & tail_mask).count_ones()),
            )
            .map(|ones| usize::try_from(ones).unwrap_or(BITS_PER_WORD))
            .fold(0, usize::saturating_add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_fill_for_true_default() {
        let mut container = BooleanContainer::new(true);
        assert!(container.get(500).unwrap());
        container.set(70, false).unwrap();
        assert!(!container.get(70).unwrap());
        assert!(container.get(69).unwrap());
        assert!(container.get(71).unwrap());
        assert!(container.get(10_000).unwrap());
        assert_eq!(container.len(), 71);
    }

    #[test]
    fn count_true_ignores_default_fill_past_len() {
        let mut container = BooleanContainer::new(true);
        container.set(70, false).unwrap();
        container.set(3, false).unwrap();
        assert_eq!(container.count_true(), 69);

        let mut container = BooleanContainer::new(false);
        assert_eq!(container.count_true(), 0);
        for i in 0..64 {
            container.set(i, true).unwrap();
        }
        assert_eq!(container.count_true(), 64);
        container.set(64, false).unwrap();
        assert_eq!(container.count_true(), 64);
    }

    #[test]
    fn set_and_get_across_word_boundaries() {
        let mut container = BooleanContainer::new(false);
        for i in [0_usize, 63, 64, 127, 128] {
            container.set(i, true).unwrap();
        }
        for i in [0_usize, 63, 64, 127, 128] {
            assert!(container.get(i).unwrap());
        }
        assert!(!container.get(1).unwrap());
        assert!(!container.get(65).unwrap());
        assert_eq!(container.count_true(), 5);
    }

    #[test]
    fn index_limit_rejects_out_of_range_access() {
        let mut container = BooleanContainer::with_index_limit(false, 3);
        container.set(2, true).unwrap();
        assert_eq!(
            container.set(3, true),
            Err(ContainerError::IndexOutOfBounds { index: 3, limit: 3 })
        );
        assert!(container.get(3).is_err());
        container.set_index_limit(10);
        assert!(!container.get(3).unwrap());
        assert!(container.get(2).unwrap());
    }

    #[test]
    fn capacity_is_grow_only() {
        let mut container = BooleanContainer::new(false);
        container.set(5, true).unwrap();
        container.set_capacity(1_000);
        assert!(container.capacity() >= 1_000);
        container.set_capacity(1);
        assert!(container.capacity() >= 1_000);
        assert!(container.get(5).unwrap());
        container.expand_capacity(4_000);
        assert!(container.capacity() >= 4_006);
    }
}
