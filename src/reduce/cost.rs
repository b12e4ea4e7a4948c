//! Cost of disabling one more prefix-length.

use serde::Serialize;

use super::enabled::EnabledSet;
use super::histogram::{split_factor, Histogram};

/// Projected effect of disabling `length`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Length that would be disabled
    pub length: u8,
    /// Next longer enabled length that receives its entries
    pub target: u8,
    /// Entries currently at `length`
    pub entries: u64,
    /// Growth of the total entry count
    pub increase: u64,
    /// Total entry count after the elimination
    pub projected_total: u64,
}

/// Every length that could be disabled next, ascending by length.
///
/// A candidate is an enabled, populated length other than 0 and the host
/// length whose entries can move onto the next longer enabled length that
/// is itself populated. The longest populated length has no such target
/// and is never a candidate.
pub fn elimination_candidates(histogram: &Histogram, enabled: &EnabledSet) -> Vec<Candidate> {
    let width = histogram.width();
    let total = histogram.total();
    let populated: Vec<u8> = enabled
        .iter()
        .filter(|length| histogram.count(*length) > 0)
        .collect();

    populated
        .windows(2)
        .filter(|pair| pair[0] != 0 && pair[0] != width)
        .map(|pair| {
            let (length, target) = (pair[0], pair[1]);
            let entries = histogram.count(length);
            let increase = entries.saturating_mul(split_factor(target - length) - 1);
            Candidate {
                length,
                target,
                entries,
                increase,
                projected_total: total.saturating_add(increase),
            }
        })
        .collect()
}

/// Candidate with the smallest increase; equal increases prefer the
/// shortest length.
pub fn cheapest(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().min_by_key(|c| (c.increase, c.length))
}
