//! Re-splitting ranges with a restricted set of prefix-lengths.

use crate::ip::range::largest_fitting_length;
use crate::ip::{Address, AddressRange, PrefixBlock};

use super::enabled::EnabledSet;

/// Lazy split of one range into blocks whose lengths are all enabled.
///
/// At each address the largest aligned block that fits is found first; if
/// its length is disabled, the next longer enabled length is used instead,
/// which subdivides that block. The host length is always enabled, so the
/// range is always covered exactly.
#[derive(Debug, Clone)]
pub struct RestrictedSplit<'a, A: Address> {
    next: Option<A>,
    end: A,
    enabled: &'a EnabledSet,
}

impl<'a, A: Address> RestrictedSplit<'a, A> {
    pub fn new(range: AddressRange<A>, enabled: &'a EnabledSet) -> Self {
        debug_assert_eq!(enabled.width(), A::BITS, "enabled set of the wrong family");
        RestrictedSplit {
            next: Some(range.start()),
            end: range.end(),
            enabled,
        }
    }
}

impl<'a, A: Address> Iterator for RestrictedSplit<'a, A> {
    type Item = PrefixBlock<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        let length = self
            .enabled
            .smallest_at_least(largest_fitting_length(cur, self.end));
        let block = PrefixBlock::from_parts(cur, length);
        let last = block.last();
        self.next = if last >= self.end { None } else { Some(last + A::ONE) };
        Some(block)
    }
}

/// Restricted split of every range, in input order.
pub fn split_ranges<'a, A: Address>(
    ranges: &'a [AddressRange<A>],
    enabled: &'a EnabledSet,
) -> impl Iterator<Item = PrefixBlock<A>> + 'a {
    ranges.iter().flat_map(move |range| range.restricted_split(enabled))
}
