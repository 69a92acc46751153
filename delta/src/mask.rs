//! The 16-bit change mask.

use std::fmt;

/// Bitmask of changed fields; bit `i` is set iff field `i` changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChangeMask(u16);

impl ChangeMask {
    /// Mask with no fields set.
    pub const EMPTY: Self = Self(0);

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns a mask with the low `count` bits set.
    ///
    /// `count` is clamped to 16.
    #[must_use]
    pub const fn all(count: usize) -> Self {
        if count >= 16 {
            Self(u16::MAX)
        } else {
            Self((1u16 << count) - 1)
        }
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of set fields.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns `true` if field `index` is set.
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index < 16 && self.0 & (1 << index) != 0
    }

    /// Sets field `index`. Indices of 16 or more are ignored.
    pub fn insert(&mut self, index: usize) {
        if index < 16 {
            self.0 |= 1 << index;
        }
    }

    /// Returns `true` if every set bit is also set in `other`.
    #[must_use]
    pub const fn is_subset_of(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterates set field indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..16).filter(move |&index| self.contains(index))
    }
}

impl fmt::Display for ChangeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_masks() {
        assert_eq!(ChangeMask::all(0).bits(), 0);
        assert_eq!(ChangeMask::all(1).bits(), 0b1);
        assert_eq!(ChangeMask::all(13).bits(), 0x1FFF);
        assert_eq!(ChangeMask::all(16).bits(), u16::MAX);
        assert_eq!(ChangeMask::all(40).bits(), u16::MAX);
    }

    #[test]
    fn insert_and_contains() {
        let mut mask = ChangeMask::EMPTY;
        mask.insert(0);
        mask.insert(15);
        mask.insert(16);
        assert!(mask.contains(0));
        assert!(mask.contains(15));
        assert!(!mask.contains(16));
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn iter_is_ascending() {
        let mask = ChangeMask::from_bits(0b1010_0000_0000_0101);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![0, 2, 13, 15]);
    }

    #[test]
    fn subset() {
        let all = ChangeMask::all(3);
        assert!(ChangeMask::from_bits(0b101).is_subset_of(all));
        assert!(!ChangeMask::from_bits(0b1000).is_subset_of(all));
    }

    #[test]
    fn display_is_binary() {
        assert_eq!(ChangeMask::from_bits(5).to_string(), "0b0000000000000101");
    }
}
