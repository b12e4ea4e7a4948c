//! Output formatting of the re-split blocks.
//!
//! Every block is printed as `base/length`, wrapped in a prefix and suffix
//! string. Host entries (/32, /128) and network entries get their own pair,
//! which is handy for emitting `ipset add` commands straight away.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::ip::{Address, PrefixBlock};

/// Strings printed around each output entry
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Decorations {
    pub prefix_ips: String,
    pub prefix_nets: String,
    pub suffix_ips: String,
    pub suffix_nets: String,
}

impl Decorations {
    /// Set the prefix for both host and network entries
    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix_ips = prefix.to_string();
        self.prefix_nets = prefix.to_string();
    }

    /// Set the suffix for both host and network entries
    pub fn set_suffix(&mut self, suffix: &str) {
        self.suffix_ips = suffix.to_string();
        self.suffix_nets = suffix.to_string();
    }

    /// One formatted output line, without the newline
    pub fn format<A: Address>(&self, block: &PrefixBlock<A>) -> String {
        let (prefix, suffix) = if block.is_host() {
            (&self.prefix_ips, &self.suffix_ips)
        } else {
            (&self.prefix_nets, &self.suffix_nets)
        };
        format!("{}{}{}", prefix, block, suffix)
    }
}

/// Write every block on its own line.
pub fn write_blocks<W, A, I>(out: &mut W, blocks: I, decorations: &Decorations) -> io::Result<usize>
where
    W: Write,
    A: Address,
    I: IntoIterator<Item = PrefixBlock<A>>,
{
    let mut written = 0;
    for block in blocks {
        writeln!(out, "{}", decorations.format(&block))?;
        written += 1;
    }
    Ok(written)
}
