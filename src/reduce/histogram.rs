//! Entries-per-prefix-length histogram.

use std::collections::BTreeMap;

use crate::ip::{Address, AddressFamily, AddressRange};

/// Number of CIDR entries per prefix-length `0..=W`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    family: AddressFamily,
    counts: Vec<u64>,
}

impl Histogram {
    /// Empty histogram for `family`
    pub fn new(family: AddressFamily) -> Self {
        Histogram {
            family,
            counts: vec![0; usize::from(family.width()) + 1],
        }
    }

    /// Count the blocks a minimal split of every range would emit.
    ///
    /// The ranges are expected to be disjoint; nothing is restricted here,
    /// so every length `0..=W` can show up.
    pub fn from_ranges<A: Address>(ranges: &[AddressRange<A>]) -> Self {
        let mut histogram = Histogram::new(A::FAMILY);
        for range in ranges {
            for block in range.minimal_split() {
                histogram.add(block.length(), 1);
            }
        }
        histogram
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn width(&self) -> u8 {
        self.family.width()
    }

    pub fn count(&self, length: u8) -> u64 {
        self.counts.get(usize::from(length)).copied().unwrap_or(0)
    }

    /// Sum over all lengths
    pub fn total(&self) -> u64 {
        self.counts.iter().fold(0u64, |acc, c| acc.saturating_add(*c))
    }

    /// Lengths with at least one entry, ascending
    pub fn populated_lengths(&self) -> impl Iterator<Item = u8> + '_ {
        self.nonzero().map(|(length, _)| length)
    }

    /// `(length, count)` pairs with a non-zero count, ascending
    pub fn nonzero(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            // index is bounded by W + 1 <= 129
            .map(|(length, count)| (length as u8, *count))
    }

    /// Same data as an ordered map, for reports
    pub fn to_map(&self) -> BTreeMap<u8, u64> {
        self.nonzero().collect()
    }

    pub(crate) fn add(&mut self, length: u8, count: u64) {
        if let Some(slot) = self.counts.get_mut(usize::from(length)) {
            *slot = slot.saturating_add(count);
        }
    }

    /// Move every entry of `from` onto the longer length `to`, each one
    /// becoming `2^(to - from)` entries.
    pub(crate) fn redistribute(&mut self, from: u8, to: u8) {
        debug_assert!(from < to, "redistribution must move to a longer length");
        let moved = self.count(from);
        if let Some(slot) = self.counts.get_mut(usize::from(from)) {
            *slot = 0;
        }
        self.add(to, moved.saturating_mul(split_factor(to - from)));
    }
}

/// `2^distance`, saturated to `u64::MAX`
pub(crate) fn split_factor(distance: u8) -> u64 {
    1u64.checked_shl(u32::from(distance)).unwrap_or(u64::MAX)
}
