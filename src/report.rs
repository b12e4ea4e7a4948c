//! Reduction statistics.
//!
//! Generates both a human-readable summary (for stderr) and a JSON report.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use crate::ip::AddressFamily;
use crate::reduce::{Candidate, Reduction};

/// Statistics of one family's run
#[derive(Debug, Clone, Serialize)]
pub struct FamilyStats {
    pub family: AddressFamily,
    /// Prefixes read from the input
    pub raw_prefixes: usize,
    /// Disjoint ranges after aggregation
    pub aggregated_ranges: usize,
    pub ceiling: u64,
    pub initial_total: u64,
    pub final_total: u64,
    pub initial_histogram: BTreeMap<u8, u64>,
    pub final_histogram: BTreeMap<u8, u64>,
    pub eliminations: Vec<Candidate>,
    pub rejected: Option<Candidate>,
    /// Prefix lengths present in the output
    pub enabled_lengths: Vec<u8>,
    /// Blocks actually written
    pub output_entries: usize,
}

impl FamilyStats {
    pub fn new(raw_prefixes: usize, aggregated_ranges: usize, reduction: &Reduction, output_entries: usize) -> Self {
        FamilyStats {
            family: reduction.family(),
            raw_prefixes,
            aggregated_ranges,
            ceiling: reduction.ceiling,
            initial_total: reduction.initial_total(),
            final_total: reduction.total(),
            initial_histogram: reduction.initial.to_map(),
            final_histogram: reduction.histogram.to_map(),
            eliminations: reduction.eliminations.clone(),
            rejected: reduction.rejected,
            enabled_lengths: reduction.active_lengths(),
            output_entries,
        }
    }
}

/// Statistics of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Input tokens that could not be parsed
    pub invalid_entries: usize,
    pub families: Vec<FamilyStats>,
}

impl RunReport {
    pub fn total_before(&self) -> u64 {
        self.families.iter().map(|f| f.initial_total).sum()
    }

    pub fn total_after(&self) -> u64 {
        self.families.iter().map(|f| f.final_total).sum()
    }
}

/// Human-readable summary of one family
pub fn family_text(stats: &FamilyStats) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("=== {}: {} raw prefixes ===", stats.family, stats.raw_prefixes));
    lines.push(format!("After aggregation: {} ranges", stats.aggregated_ranges));
    lines.push(format!(
        "Initial: {} entries across {} prefixes",
        stats.initial_total,
        stats.initial_histogram.len()
    ));
    for (length, count) in &stats.initial_histogram {
        lines.push(format!("  /{}: {} entries", length, count));
    }
    lines.push(format!("Acceptable ceiling: {} entries", stats.ceiling));

    for step in &stats.eliminations {
        lines.push(format!(
            "  Merge /{} ({} entries) -> /{}: +{} entries",
            step.length, step.entries, step.target, step.increase
        ));
    }
    match &stats.rejected {
        Some(step) => lines.push(format!(
            "  Cannot merge /{} -> /{}: increase {} would exceed ceiling ({}+{} > {})",
            step.length,
            step.target,
            step.increase,
            step.projected_total.saturating_sub(step.increase),
            step.increase,
            stats.ceiling
        )),
        None => lines.push("  Nothing more to reduce".to_string()),
    }

    let initial_prefixes = stats.initial_histogram.len();
    lines.push(format!(
        "Eliminated {}/{} prefixes ({} remain), total entries now {}",
        stats.eliminations.len(),
        initial_prefixes,
        initial_prefixes - stats.eliminations.len(),
        stats.final_total
    ));
    let enabled: Vec<String> = stats.enabled_lengths.iter().map(|l| format!("/{}", l)).collect();
    lines.push(format!("Enabled prefix lengths: {}", enabled.join(" ")));

    lines
}

/// Human-readable summary of the whole run
pub fn generate_text_report(report: &RunReport) -> String {
    let mut lines = Vec::new();
    if report.invalid_entries > 0 {
        lines.push(format!("Skipped {} invalid entries", report.invalid_entries));
    }
    for stats in &report.families {
        lines.extend(family_text(stats));
        lines.push(String::new());
    }
    lines.push(format!(
        "Entries before reduction: {}, after: {}",
        report.total_before(),
        report.total_after()
    ));
    lines.join("\n")
}

/// Generate JSON report
pub fn generate_json_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}
