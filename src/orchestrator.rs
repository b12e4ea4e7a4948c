//! Run orchestrator.
//!
//! This module coordinates one complete run: per family it aggregates the
//! raw prefixes, reduces the prefix-lengths and re-splits the ranges. The
//! two families share nothing and can run side by side.

use std::io::Write;

use color_eyre::eyre::{Result, WrapErr};
use log::{debug, info};

use crate::aggregate::Aggregator;
use crate::config::Config;
use crate::input::ParsedInput;
use crate::ip::{Address, AddressRange, PrefixBlock};
use crate::output::{write_blocks, Decorations};
use crate::reduce::{reduce_ranges, ReduceParams};
use crate::report::{FamilyStats, RunReport};

/// Result of one family
#[derive(Debug, Clone)]
pub struct FamilyOutcome<A: Address> {
    pub blocks: Vec<PrefixBlock<A>>,
    pub stats: FamilyStats,
}

/// Result of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub v4: Vec<PrefixBlock<u32>>,
    pub v6: Vec<PrefixBlock<u128>>,
    pub report: RunReport,
}

impl RunOutput {
    /// Write IPv4 blocks, then IPv6 blocks
    pub fn write_to<W: Write>(&self, out: &mut W, decorations: &Decorations) -> Result<usize> {
        let v4 = write_blocks(out, self.v4.iter().copied(), decorations).wrap_err("Failed to write IPv4 output")?;
        let v6 = write_blocks(out, self.v6.iter().copied(), decorations).wrap_err("Failed to write IPv6 output")?;
        out.flush().wrap_err("Failed to flush output")?;
        Ok(v4 + v6)
    }
}

/// Aggregate, reduce and re-split one family's raw prefixes.
pub fn process_family<A, G>(raw: Vec<AddressRange<A>>, aggregator: &G, params: &ReduceParams) -> Result<FamilyOutcome<A>>
where
    A: Address,
    G: Aggregator,
{
    let family = A::FAMILY;
    let raw_prefixes = raw.len();
    debug!("{}: {} raw prefixes", family, raw_prefixes);

    let ranges = aggregator
        .aggregate(raw)
        .wrap_err_with(|| format!("Failed to aggregate {} prefixes", family))?;
    debug!("{}: {} ranges after aggregation", family, ranges.len());

    let (blocks, reduction) = reduce_ranges(&ranges, params);
    info!(
        "{}: {} prefixes -> {} ranges -> {} entries",
        family,
        raw_prefixes,
        ranges.len(),
        blocks.len()
    );

    let stats = FamilyStats::new(raw_prefixes, ranges.len(), &reduction, blocks.len());
    Ok(FamilyOutcome { blocks, stats })
}

fn process_optional<A, G>(raw: Vec<AddressRange<A>>, enabled: bool, aggregator: &G, params: &ReduceParams) -> Result<Option<FamilyOutcome<A>>>
where
    A: Address,
    G: Aggregator,
{
    if !enabled {
        if !raw.is_empty() {
            info!("{}: skipping {} prefixes (family filtered out)", A::FAMILY, raw.len());
        }
        return Ok(None);
    }
    if raw.is_empty() {
        return Ok(None);
    }
    process_family(raw, aggregator, params).map(Some)
}

/// Process both families of `input` according to `config`.
pub fn run<G>(input: ParsedInput, config: &Config, aggregator: &G) -> Result<RunOutput>
where
    G: Aggregator + Sync,
{
    let ParsedInput { v4, v6, invalid } = input;
    let params = &config.reduce;
    let want_v4 = config.family.includes(crate::ip::AddressFamily::Ipv4);
    let want_v6 = config.family.includes(crate::ip::AddressFamily::Ipv6);

    let (v4, v6) = if config.parallel {
        rayon::join(
            || process_optional(v4, want_v4, aggregator, params),
            || process_optional(v6, want_v6, aggregator, params),
        )
    } else {
        (
            process_optional(v4, want_v4, aggregator, params),
            process_optional(v6, want_v6, aggregator, params),
        )
    };

    let mut output = RunOutput {
        report: RunReport {
            invalid_entries: invalid,
            families: Vec::new(),
        },
        ..RunOutput::default()
    };

    if let Some(outcome) = v4? {
        output.v4 = outcome.blocks;
        output.report.families.push(outcome.stats);
    }
    if let Some(outcome) = v6? {
        output.v6 = outcome.blocks;
        output.report.families.push(outcome.stats);
    }

    Ok(output)
}
