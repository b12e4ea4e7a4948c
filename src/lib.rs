//! # ipreduce - prefix-length reducer for ipset `hash:net` sets
//!
//! This library reduces the number of distinct CIDR prefix-lengths in a set
//! of IPv4 and IPv6 networks, trading a bounded increase in entry count for
//! fewer unique masks.
//!
//! ## Overview
//!
//! A `hash:net` ipset performs one hash lookup per distinct prefix-length it
//! contains. Lists assembled from many sources easily carry 20 or more
//! lengths. Splitting the rare short prefixes into more entries of a common
//! longer length keeps the set's contents identical while making lookups
//! cheaper.
//!
//! ## Algorithm
//!
//! For each address family independently:
//!
//! 1. Aggregate the raw prefixes into disjoint, sorted ranges.
//! 2. Count how many CIDR entries each prefix-length produces.
//! 3. Compute the acceptable ceiling
//!    `max(total * (1 + reduce_pct / 100), reduce_entries_min)`.
//! 4. Repeatedly eliminate the prefix-length whose merge into the next
//!    longer populated length adds the fewest entries, while the total
//!    stays within the ceiling.
//! 5. Re-split every range using only the surviving lengths.
//!
//! ## Architecture
//!
//! - `ip`: address width abstraction, ranges and CIDR blocks
//! - `reduce`: histogram, cost model, greedy eliminator, restricted splitter
//! - `aggregate`: range merging, in process or through an external tool
//! - `input`: reading and parsing prefix lists
//! - `config` / `config_loader`: parameters, YAML loading, CLI overrides
//! - `orchestrator`: per-family pipeline
//! - `output` / `report`: formatted entries and statistics
//!
//! ## Example Usage
//!
//! ```rust
//! use ipreduce::aggregate::RangeMerger;
//! use ipreduce::config::Config;
//! use ipreduce::input::parse_lines;
//! use ipreduce::orchestrator;
//!
//! let input = parse_lines("10.0.0.0/24\n10.0.1.0/25\n".lines());
//! let output = orchestrator::run(input, &Config::default(), &RangeMerger)?;
//!
//! // the default ceiling of 16384 entries lets /24 merge into /25
//! let blocks: Vec<String> = output.v4.iter().map(|b| b.to_string()).collect();
//! assert_eq!(blocks, vec!["10.0.0.0/25", "10.0.0.128/25", "10.0.1.0/25"]);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Library components report typed errors built with `thiserror`; the I/O
//! facing functions return `color_eyre` results with context attached.

pub mod aggregate;
pub mod config;
pub mod config_loader;
pub mod input;
pub mod ip;
pub mod orchestrator;
pub mod output;
pub mod reduce;
pub mod report;
