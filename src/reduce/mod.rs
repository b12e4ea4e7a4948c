//! Prefix-length reduction.
//!
//! The pipeline for one family is:
//!
//! 1. [`Histogram::from_ranges`] counts the entries per prefix-length of the
//!    minimally split input,
//! 2. [`eliminate`] greedily disables lengths while the entry count stays
//!    below the ceiling,
//! 3. [`split_ranges`] re-expresses the input with the surviving lengths.

pub mod cost;
pub mod eliminator;
pub mod enabled;
pub mod histogram;
pub mod splitter;

pub use cost::{cheapest, elimination_candidates, Candidate};
pub use eliminator::{eliminate, ReduceParams, Reduction, DEFAULT_REDUCE_ENTRIES_MIN, DEFAULT_REDUCE_PCT};
pub use enabled::EnabledSet;
pub use histogram::Histogram;
pub use splitter::{split_ranges, RestrictedSplit};

use crate::ip::{Address, AddressRange, PrefixBlock};

/// Reduce one family's disjoint, sorted ranges and return the re-split
/// blocks together with the reduction that produced them.
pub fn reduce_ranges<A: Address>(
    ranges: &[AddressRange<A>],
    params: &ReduceParams,
) -> (Vec<PrefixBlock<A>>, Reduction) {
    let reduction = eliminate(Histogram::from_ranges(ranges), params);
    let blocks = split_ranges(ranges, &reduction.enabled).collect();
    (blocks, reduction)
}
