//! Aggregation of raw prefixes into disjoint, sorted ranges.
//!
//! The reducer only ever sees the output of an [`Aggregator`]. The default
//! [`RangeMerger`] works in process; [`CommandAggregator`] pipes the
//! prefixes through an external tool such as `aggregate6`.

use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use log::debug;

use crate::input::{extract_token, parse_prefix, ParseError, RawPrefix};
use crate::ip::{Address, AddressFamily, AddressRange};

/// Errors raised while aggregating
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("aggregator command is empty")]
    EmptyCommand,

    #[error("failed to run aggregator '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("aggregator '{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("aggregator '{program}' produced an invalid prefix: {source}")]
    InvalidOutput { program: String, source: ParseError },

    #[error("aggregator '{program}' returned {found} prefix '{token}' for {expected} input")]
    WrongFamily {
        program: String,
        token: String,
        expected: AddressFamily,
        found: AddressFamily,
    },
}

/// Turns overlapping or adjacent ranges into a disjoint, sorted list
pub trait Aggregator {
    fn aggregate<A: Address>(&self, ranges: Vec<AddressRange<A>>) -> Result<Vec<AddressRange<A>>, AggregateError>;
}

/// In-process aggregation: sort, then merge overlapping and adjacent ranges
#[derive(Debug, Default, Clone, Copy)]
pub struct RangeMerger;

impl Aggregator for RangeMerger {
    fn aggregate<A: Address>(&self, ranges: Vec<AddressRange<A>>) -> Result<Vec<AddressRange<A>>, AggregateError> {
        Ok(merge_ranges(ranges))
    }
}

/// Sort `ranges` and merge every pair that overlaps or touches.
pub fn merge_ranges<A: Address>(mut ranges: Vec<AddressRange<A>>) -> Vec<AddressRange<A>> {
    ranges.sort_unstable();

    let mut merged: Vec<AddressRange<A>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            // a range ending at MAX swallows everything after it
            if last.end() == A::MAX || range.start() <= last.end() + A::ONE {
                if range.end() > last.end() {
                    if let Some(grown) = AddressRange::new(last.start(), range.end()) {
                        *last = grown;
                    }
                }
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

/// Aggregation through an external command.
///
/// The family's prefixes are written to the command's stdin as CIDR lines
/// with `-4` or `-6` appended to its arguments, the way `aggregate6`
/// expects. Its output is parsed and merged once more so the result is
/// disjoint even if the tool only deduplicates.
#[derive(Debug, Clone)]
pub struct CommandAggregator {
    program: String,
    args: Vec<String>,
}

impl CommandAggregator {
    /// Build from a whitespace-separated command line.
    pub fn new(command_line: &str) -> Result<Self, AggregateError> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next().ok_or(AggregateError::EmptyCommand)?;
        Ok(CommandAggregator {
            program,
            args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn family_flag(family: AddressFamily) -> &'static str {
        match family {
            AddressFamily::Ipv4 => "-4",
            AddressFamily::Ipv6 => "-6",
        }
    }

    fn run(&self, family: AddressFamily, input: String) -> Result<String, AggregateError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(Self::family_flag(family))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AggregateError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // feed stdin from a separate thread so a full stdout pipe cannot stall us
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || -> io::Result<()> {
                stdin.write_all(input.as_bytes())?;
                stdin.flush()
            })
        });

        let output = child.wait_with_output().map_err(|source| AggregateError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                // the tool may exit before reading everything; its status tells the story
                Ok(Err(e)) => debug!("aggregator stdin closed early: {}", e),
                Err(_) => debug!("aggregator stdin writer panicked"),
            }
        }

        if !output.status.success() {
            return Err(AggregateError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Aggregator for CommandAggregator {
    fn aggregate<A: Address>(&self, ranges: Vec<AddressRange<A>>) -> Result<Vec<AddressRange<A>>, AggregateError> {
        let mut input = String::new();
        for range in &ranges {
            for block in range.minimal_split() {
                input.push_str(&block.to_string());
                input.push('\n');
            }
        }

        debug!("Running aggregator '{}' on {} {} ranges", self.program, ranges.len(), A::FAMILY);
        let stdout = self.run(A::FAMILY, input)?;

        let mut result = Vec::new();
        for token in stdout.lines().filter_map(extract_token) {
            let prefix = parse_prefix(token).map_err(|source| AggregateError::InvalidOutput {
                program: self.program.clone(),
                source,
            })?;
            let wrong_family = |found: AddressFamily| AggregateError::WrongFamily {
                program: self.program.clone(),
                token: token.to_string(),
                expected: A::FAMILY,
                found,
            };
            let range = match prefix {
                RawPrefix::V4(range) => convert_range::<u32, A>(range).ok_or_else(|| wrong_family(AddressFamily::Ipv4))?,
                RawPrefix::V6(range) => convert_range::<u128, A>(range).ok_or_else(|| wrong_family(AddressFamily::Ipv6))?,
            };
            result.push(range);
        }

        Ok(merge_ranges(result))
    }
}

/// Re-type a range when both widths belong to the same family.
fn convert_range<S: Address, T: Address>(range: AddressRange<S>) -> Option<AddressRange<T>> {
    let start = T::from_ip(range.start().to_ip())?;
    let end = T::from_ip(range.end().to_ip())?;
    AddressRange::new(start, end)
}
