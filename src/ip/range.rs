//! Address ranges and CIDR blocks.
//!
//! An [`AddressRange`] is an inclusive, not necessarily aligned, run of
//! addresses. A [`PrefixBlock`] is one CIDR entry. The minimal split turns
//! the former into a lazy sequence of the latter.

use std::fmt;

use super::address::{Address, AddressFamily};
use crate::reduce::enabled::EnabledSet;
use crate::reduce::splitter::RestrictedSplit;

/// Inclusive block of addresses `start..=end` within one family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressRange<A: Address> {
    start: A,
    end: A,
}

impl<A: Address> AddressRange<A> {
    /// Returns `None` when `start > end`.
    pub fn new(start: A, end: A) -> Option<Self> {
        if start <= end {
            Some(AddressRange { start, end })
        } else {
            None
        }
    }

    /// Range holding exactly one address
    pub fn single(addr: A) -> Self {
        AddressRange { start: addr, end: addr }
    }

    /// The whole address space of the family
    pub fn full() -> Self {
        AddressRange { start: A::ZERO, end: A::MAX }
    }

    pub fn start(&self) -> A {
        self.start
    }

    pub fn end(&self) -> A {
        self.end
    }

    pub fn family(&self) -> AddressFamily {
        A::FAMILY
    }

    /// Minimal covering sequence of CIDR blocks, largest aligned block first.
    pub fn minimal_split(&self) -> MinimalSplit<A> {
        MinimalSplit {
            next: Some(self.start),
            end: self.end,
        }
    }

    /// Covering sequence of CIDR blocks using only lengths in `enabled`.
    pub fn restricted_split<'a>(&self, enabled: &'a EnabledSet) -> RestrictedSplit<'a, A> {
        RestrictedSplit::new(*self, enabled)
    }
}

impl<A: Address> fmt::Display for AddressRange<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.to_ip(), self.end.to_ip())
    }
}

/// One CIDR entry: `base/length` with `base` aligned to `length`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrefixBlock<A: Address> {
    base: A,
    length: u8,
}

impl<A: Address> PrefixBlock<A> {
    /// Returns `None` when `length` exceeds the family width or `base` has
    /// host bits set.
    pub fn new(base: A, length: u8) -> Option<Self> {
        if length > A::BITS {
            return None;
        }
        if base & A::host_mask(A::BITS - length) != A::ZERO {
            return None;
        }
        Some(PrefixBlock { base, length })
    }

    /// Block of `length` containing `addr`, with host bits cleared.
    pub fn containing(addr: A, length: u8) -> Option<Self> {
        if length > A::BITS {
            return None;
        }
        let base = addr & !A::host_mask(A::BITS - length);
        Some(PrefixBlock { base, length })
    }

    pub(crate) fn from_parts(base: A, length: u8) -> Self {
        debug_assert!(Self::new(base, length).is_some(), "unaligned block {:?}/{}", base, length);
        PrefixBlock { base, length }
    }

    pub fn base(&self) -> A {
        self.base
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn first(&self) -> A {
        self.base
    }

    pub fn last(&self) -> A {
        self.base | A::host_mask(A::BITS - self.length)
    }

    /// Single-address entry (/32 or /128)
    pub fn is_host(&self) -> bool {
        self.length == A::BITS
    }

    pub fn to_range(&self) -> AddressRange<A> {
        AddressRange {
            start: self.first(),
            end: self.last(),
        }
    }
}

impl<A: Address> fmt::Display for PrefixBlock<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base.to_ip(), self.length)
    }
}

/// Length of the largest aligned block starting at `cur` that stays within
/// `cur..=end`.
pub(crate) fn largest_fitting_length<A: Address>(cur: A, end: A) -> u8 {
    // trailing_zeros of 0 is BITS, so the zero address aligns to every length
    let align = cur.trailing_zeros().min(u32::from(A::BITS)) as u8;
    let span = end - cur;
    let fit = if span == A::MAX {
        A::BITS
    } else {
        (span + A::ONE).bit_length() - 1
    };
    A::BITS - align.min(fit)
}

/// Lazy minimal split of one range. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct MinimalSplit<A: Address> {
    next: Option<A>,
    end: A,
}

impl<A: Address> Iterator for MinimalSplit<A> {
    type Item = PrefixBlock<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        let block = PrefixBlock::from_parts(cur, largest_fitting_length(cur, self.end));
        let last = block.last();
        self.next = if last >= self.end { None } else { Some(last + A::ONE) };
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn v4(s: &str) -> u32 {
        u32::from(s.parse::<Ipv4Addr>().unwrap())
    }

    fn v4_range(a: &str, b: &str) -> AddressRange<u32> {
        AddressRange::new(v4(a), v4(b)).unwrap()
    }

    fn render<A: Address>(blocks: impl Iterator<Item = PrefixBlock<A>>) -> Vec<String> {
        blocks.map(|b| b.to_string()).collect()
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(AddressRange::new(5u32, 4u32).is_none());
        assert!(AddressRange::new(4u32, 4u32).is_some());
    }

    #[test]
    fn test_block_alignment() {
        assert!(PrefixBlock::new(v4("10.0.0.0"), 24).is_some());
        assert!(PrefixBlock::new(v4("10.0.0.1"), 24).is_none());
        assert!(PrefixBlock::new(v4("10.0.0.1"), 32).is_some());
        assert!(PrefixBlock::new(0u32, 33).is_none());
        assert!(PrefixBlock::new(0u32, 0).is_some());

        let block = PrefixBlock::containing(v4("10.1.2.3"), 16).unwrap();
        assert_eq!(block.to_string(), "10.1.0.0/16");
        assert_eq!(block.last(), v4("10.1.255.255"));
    }

    #[test]
    fn test_minimal_split_aligned() {
        let blocks = render(v4_range("10.0.0.0", "10.0.0.255").minimal_split());
        assert_eq!(blocks, vec!["10.0.0.0/24"]);
    }

    #[test]
    fn test_minimal_split_unaligned() {
        let blocks = render(v4_range("10.0.0.1", "10.0.0.10").minimal_split());
        assert_eq!(
            blocks,
            vec!["10.0.0.1/32", "10.0.0.2/31", "10.0.0.4/30", "10.0.0.8/31", "10.0.0.10/32"]
        );
    }

    #[test]
    fn test_minimal_split_full_space() {
        let blocks: Vec<_> = AddressRange::<u32>::full().minimal_split().collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].length(), 0);

        let blocks6: Vec<_> = AddressRange::<u128>::full().minimal_split().collect();
        assert_eq!(blocks6.len(), 1);
        assert_eq!(blocks6[0].length(), 0);
    }

    #[test]
    fn test_minimal_split_top_of_space() {
        let blocks = render(v4_range("255.255.255.254", "255.255.255.255").minimal_split());
        assert_eq!(blocks, vec!["255.255.255.254/31"]);

        let blocks = render(v4_range("128.0.0.0", "255.255.255.255").minimal_split());
        assert_eq!(blocks, vec!["128.0.0.0/1"]);

        let blocks = render(v4_range("0.0.0.1", "255.255.255.255").minimal_split());
        assert_eq!(blocks.len(), 32);
        assert_eq!(blocks.first().unwrap(), "0.0.0.1/32");
        assert_eq!(blocks.last().unwrap(), "128.0.0.0/1");
    }

    #[test]
    fn test_minimal_split_is_restartable() {
        let mut split = v4_range("10.0.0.0", "10.0.0.5").minimal_split();
        split.next();
        let snapshot = split.clone();
        let rest: Vec<_> = split.collect();
        let again: Vec<_> = snapshot.collect();
        assert_eq!(rest, again);
        assert_eq!(render(rest.into_iter()), vec!["10.0.0.4/31"]);
    }

    #[test]
    fn test_minimal_split_ipv6() {
        let start = u128::from("2001:db8::".parse::<std::net::Ipv6Addr>().unwrap());
        let range = AddressRange::new(start, start + (1u128 << 80) * 3 - 1).unwrap();
        let blocks = render(range.minimal_split());
        assert_eq!(blocks, vec!["2001:db8::/47", "2001:db8:2::/48"]);
    }

    #[test]
    fn test_minimal_split_covers_exactly() {
        let range = v4_range("192.0.2.7", "192.0.3.200");
        let mut expected = range.start();
        for block in range.minimal_split() {
            assert_eq!(block.first(), expected);
            assert!(PrefixBlock::new(block.base(), block.length()).is_some());
            expected = block.last().wrapping_add(1);
        }
        assert_eq!(expected, range.end() + 1);
    }
}
