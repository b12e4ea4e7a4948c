//! Reading raw prefixes from files and stdin.
//!
//! Accepts one prefix per line in plain `ADDR[/LEN]` form or as ipset save
//! output (`add SETNAME ADDR/LEN`). Comments starting with `#` or `;` and
//! blank lines are skipped. Host bits are masked off, so `10.0.0.7/24` is
//! read as `10.0.0.0/24`.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use log::{debug, warn};

use crate::ip::{Address, AddressFamily, AddressRange, PrefixBlock};

/// Errors for a single prefix token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid address in '{token}'")]
    InvalidAddress { token: String },

    #[error("invalid prefix length in '{token}'")]
    InvalidLength { token: String },

    #[error("prefix length {length} exceeds {max} in '{token}'")]
    LengthOutOfRange { token: String, length: u8, max: u8 },
}

/// One parsed prefix, tagged by family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPrefix {
    V4(AddressRange<u32>),
    V6(AddressRange<u128>),
}

impl RawPrefix {
    pub fn family(&self) -> AddressFamily {
        match self {
            RawPrefix::V4(_) => AddressFamily::Ipv4,
            RawPrefix::V6(_) => AddressFamily::Ipv6,
        }
    }
}

/// Prefixes of one input, split by family
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub v4: Vec<AddressRange<u32>>,
    pub v6: Vec<AddressRange<u128>>,
    /// Tokens that could not be parsed
    pub invalid: usize,
}

impl ParsedInput {
    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty()
    }

    pub fn push(&mut self, prefix: RawPrefix) {
        match prefix {
            RawPrefix::V4(range) => self.v4.push(range),
            RawPrefix::V6(range) => self.v6.push(range),
        }
    }
}

/// Pull the prefix token out of one input line.
///
/// Returns `None` for blank lines, comments and ipset lines without a
/// member.
pub fn extract_token(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
        return None;
    }

    let mut parts = line.split_whitespace();
    let first = parts.next()?;
    match first {
        "add" | "create" => parts.nth(1),
        _ => Some(first),
    }
}

/// Parse `ADDR` or `ADDR/LEN`, masking host bits.
pub fn parse_prefix(token: &str) -> Result<RawPrefix, ParseError> {
    let (addr_part, len_part) = match token.split_once('/') {
        Some((addr, len)) => (addr, Some(len)),
        None => (token, None),
    };

    let ip: IpAddr = addr_part.parse().map_err(|_| ParseError::InvalidAddress {
        token: token.to_string(),
    })?;
    let length = match len_part {
        Some(len) => Some(len.parse::<u8>().map_err(|_| ParseError::InvalidLength {
            token: token.to_string(),
        })?),
        None => None,
    };

    match ip {
        IpAddr::V4(_) => prefix_range::<u32>(ip, length, token).map(RawPrefix::V4),
        IpAddr::V6(_) => prefix_range::<u128>(ip, length, token).map(RawPrefix::V6),
    }
}

fn prefix_range<A: Address>(ip: IpAddr, length: Option<u8>, token: &str) -> Result<AddressRange<A>, ParseError> {
    let addr = A::from_ip(ip).ok_or_else(|| ParseError::InvalidAddress {
        token: token.to_string(),
    })?;
    let length = length.unwrap_or(A::BITS);
    let block = PrefixBlock::containing(addr, length).ok_or_else(|| ParseError::LengthOutOfRange {
        token: token.to_string(),
        length,
        max: A::BITS,
    })?;
    Ok(block.to_range())
}

/// Parse every line, warning about and counting tokens that fail.
pub fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> ParsedInput {
    let mut parsed = ParsedInput::default();
    for token in lines.into_iter().filter_map(extract_token) {
        match parse_prefix(token) {
            Ok(prefix) => parsed.push(prefix),
            Err(e) => {
                warn!("skipping invalid entry: {}", e);
                parsed.invalid += 1;
            }
        }
    }
    debug!(
        "Parsed {} IPv4 and {} IPv6 prefixes ({} invalid)",
        parsed.v4.len(),
        parsed.v6.len(),
        parsed.invalid
    );
    parsed
}

/// Read all lines of the given sources. `-` or an empty list means stdin.
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<String>> {
    if paths.is_empty() {
        return read_from(io::stdin().lock()).wrap_err("Failed to read prefixes from stdin");
    }

    let mut lines = Vec::new();
    for path in paths {
        if path == Path::new("-") {
            lines.extend(read_from(io::stdin().lock()).wrap_err("Failed to read prefixes from stdin")?);
        } else {
            let file = File::open(path)
                .wrap_err_with(|| format!("Failed to open input file '{}'", path.display()))?;
            lines.extend(
                read_from(file).wrap_err_with(|| format!("Failed to read input file '{}'", path.display()))?,
            );
        }
    }
    Ok(lines)
}

fn read_from<R: Read>(reader: R) -> io::Result<Vec<String>> {
    BufReader::new(reader).lines().collect()
}
