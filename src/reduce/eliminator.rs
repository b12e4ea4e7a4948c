//! Greedy prefix-length elimination.
//!
//! Repeatedly disables the length whose removal grows the entry count the
//! least, as long as the grown total stays within the ceiling.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::cost::{cheapest, elimination_candidates, Candidate};
use super::enabled::EnabledSet;
use super::histogram::Histogram;
use crate::ip::AddressFamily;

/// Default acceptable increase of entries, in percent
pub const DEFAULT_REDUCE_PCT: f64 = 20.0;

/// Default absolute floor of the acceptable entry count
pub const DEFAULT_REDUCE_ENTRIES_MIN: u64 = 16384;

/// Tuning of one reduction run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceParams {
    pub reduce_pct: f64,
    pub reduce_entries_min: u64,
}

impl Default for ReduceParams {
    fn default() -> Self {
        ReduceParams {
            reduce_pct: DEFAULT_REDUCE_PCT,
            reduce_entries_min: DEFAULT_REDUCE_ENTRIES_MIN,
        }
    }
}

impl ReduceParams {
    /// Largest acceptable total for a family that starts with `total`
    /// entries: `max(floor(total * (100 + pct) / 100), entries_min)`.
    pub fn ceiling(&self, total: u64) -> u64 {
        // float-to-int `as` saturates, which is what we want for huge totals
        let grown = (total as f64 * (100.0 + self.reduce_pct) / 100.0).floor() as u64;
        grown.max(self.reduce_entries_min)
    }
}

/// Terminal state of the eliminator for one family
#[derive(Debug, Clone)]
pub struct Reduction {
    /// Histogram before any elimination
    pub initial: Histogram,
    /// Histogram after the committed eliminations
    pub histogram: Histogram,
    pub enabled: EnabledSet,
    pub ceiling: u64,
    /// Committed eliminations in order
    pub eliminations: Vec<Candidate>,
    /// Cheapest candidate that was turned down for exceeding the ceiling
    pub rejected: Option<Candidate>,
}

impl Reduction {
    pub fn family(&self) -> AddressFamily {
        self.histogram.family()
    }

    pub fn initial_total(&self) -> u64 {
        self.initial.total()
    }

    pub fn total(&self) -> u64 {
        self.histogram.total()
    }

    /// Enabled lengths that still carry entries
    pub fn active_lengths(&self) -> Vec<u8> {
        self.histogram.populated_lengths().collect()
    }
}

/// Run the greedy elimination over `histogram`.
///
/// The enabled set starts as the populated lengths plus the host length, so
/// a disabled length always re-splits into the length its entries were
/// costed against. Only commits an elimination whose projected total stays
/// within the ceiling; stops at the first one that would not, or when nothing is left
/// to eliminate.
pub fn eliminate(histogram: Histogram, params: &ReduceParams) -> Reduction {
    let family = histogram.family();
    let initial = histogram.clone();
    let mut histogram = histogram;
    let mut enabled = EnabledSet::from_lengths(family, histogram.populated_lengths());
    let mut eliminations = Vec::new();
    let mut rejected = None;

    let mut total = histogram.total();
    let ceiling = params.ceiling(total);
    let initial_lengths = histogram.populated_lengths().count();

    debug!(
        "{}: {} entries across {} prefix lengths, ceiling {}",
        family, total, initial_lengths, ceiling
    );

    loop {
        let candidates = elimination_candidates(&histogram, &enabled);
        let Some(best) = cheapest(&candidates).copied() else {
            debug!("{}: nothing more to reduce", family);
            break;
        };

        // a saturated projection means the real total does not fit in u64
        if best.projected_total > ceiling || best.projected_total == u64::MAX {
            debug!(
                "{}: cannot merge /{} -> /{}: increase {} would exceed ceiling ({}+{} > {})",
                family, best.length, best.target, best.increase, total, best.increase, ceiling
            );
            rejected = Some(best);
            break;
        }

        debug!(
            "{}: merge /{} ({} entries) -> /{}: +{} entries",
            family, best.length, best.entries, best.target, best.increase
        );

        histogram.redistribute(best.length, best.target);
        enabled.remove(best.length);
        total = histogram.total();
        debug_assert_eq!(total, best.projected_total);
        eliminations.push(best);
    }

    info!(
        "{}: eliminated {}/{} prefix lengths ({} remain), entries {} -> {}",
        family,
        eliminations.len(),
        initial_lengths,
        initial_lengths - eliminations.len(),
        initial.total(),
        total
    );

    Reduction {
        initial,
        histogram,
        enabled,
        ceiling,
        eliminations,
        rejected,
    }
}
