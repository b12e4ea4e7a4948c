//! Set of prefix-lengths permitted when re-splitting ranges.

use std::collections::BTreeSet;

use crate::ip::AddressFamily;

/// Prefix-lengths still allowed for one family.
///
/// Only ever shrinks once built. The host length `W` can never be removed,
/// so every range can always be covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledSet {
    width: u8,
    lengths: BTreeSet<u8>,
}

impl EnabledSet {
    /// All lengths `0..=W` of `family`
    pub fn full(family: AddressFamily) -> Self {
        let width = family.width();
        EnabledSet {
            width,
            lengths: (0..=width).collect(),
        }
    }

    /// Only the given lengths plus the host length.
    ///
    /// Lengths above the family width are ignored.
    pub fn from_lengths(family: AddressFamily, lengths: impl IntoIterator<Item = u8>) -> Self {
        let width = family.width();
        let mut lengths: BTreeSet<u8> = lengths.into_iter().filter(|l| *l <= width).collect();
        lengths.insert(width);
        EnabledSet { width, lengths }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn contains(&self, length: u8) -> bool {
        self.lengths.contains(&length)
    }

    /// Disable `length`. Returns false if it was not enabled or is the host
    /// length.
    pub fn remove(&mut self, length: u8) -> bool {
        if length == self.width {
            return false;
        }
        self.lengths.remove(&length)
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.lengths.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Smallest enabled length `>= length`. Always exists because the host
    /// length stays enabled.
    pub fn smallest_at_least(&self, length: u8) -> u8 {
        self.lengths
            .range(length..)
            .next()
            .copied()
            .unwrap_or(self.width)
    }
}
