use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ip::AddressFamily;
use crate::output::Decorations;
use crate::reduce::ReduceParams;

/// Which address families get processed
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FamilyFilter {
    /// IPv4 and IPv6
    #[default]
    Both,
    /// Only IPv4 prefixes, IPv6 input is ignored
    Ipv4,
    /// Only IPv6 prefixes, IPv4 input is ignored
    Ipv6,
}

impl FamilyFilter {
    pub fn includes(self, family: AddressFamily) -> bool {
        match self {
            FamilyFilter::Both => true,
            FamilyFilter::Ipv4 => family == AddressFamily::Ipv4,
            FamilyFilter::Ipv6 => family == AddressFamily::Ipv6,
        }
    }
}

/// Complete run configuration, loadable from YAML
///
/// ```yaml
/// reduce:
///   reduce_pct: 20
///   reduce_entries_min: 16384
/// family: both          # both | ipv4 | ipv6
/// parallel: true
/// aggregator_cmd: "aggregate6"
/// print_stats: false
/// stats_json: "stats.json"
/// output:
///   prefix_nets: "add blocklist "
///   prefix_ips: "add blocklist "
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub reduce: ReduceParams,
    pub family: FamilyFilter,
    /// Process the two families on separate threads
    pub parallel: bool,
    /// External aggregation command; in-process merging when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregator_cmd: Option<String>,
    pub print_stats: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_json: Option<PathBuf>,
    pub output: Decorations,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reduce: ReduceParams::default(),
            family: FamilyFilter::Both,
            parallel: true,
            aggregator_cmd: None,
            print_stats: false,
            stats_json: None,
            output: Decorations::default(),
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let pct = self.reduce.reduce_pct;
        if !pct.is_finite() || pct < 0.0 {
            return Err(ValidationError::InvalidReduce(format!(
                "reduce_pct must be a non-negative number, got {}",
                pct
            )));
        }

        if let Some(cmd) = &self.aggregator_cmd {
            if cmd.trim().is_empty() {
                return Err(ValidationError::InvalidAggregator(
                    "aggregator_cmd cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid reduce configuration: {0}")]
    InvalidReduce(String),
    #[error("Invalid aggregator configuration: {0}")]
    InvalidAggregator(String),
}
