use clap::{ArgGroup, Parser};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{debug, info};
use std::io;
use std::path::PathBuf;

use ipreduce::aggregate::{CommandAggregator, RangeMerger};
use ipreduce::config::Config;
use ipreduce::config_loader::{self, CliOverrides};
use ipreduce::input;
use ipreduce::orchestrator::{self, RunOutput};
use ipreduce::report;

/// Reduce the number of distinct CIDR prefix-lengths in an IP set, trading a
/// bounded increase in entries for fewer unique masks. Works with IPv4 and IPv6.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("family").args(["only_v4", "only_v6"])))]
struct Args {
    /// Input files with one prefix per line (default: stdin, `-` also means stdin)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// YAML configuration file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Acceptable increase in entries, in percent [default: 20]
    #[arg(long = "ipset-reduce", value_name = "PERCENT")]
    reduce_pct: Option<f64>,

    /// Minimum acceptable number of entries [default: 16384]
    #[arg(long = "ipset-reduce-entries", value_name = "ENTRIES")]
    reduce_entries: Option<u64>,

    /// Process only IPv4 prefixes
    #[arg(short = '4', long)]
    only_v4: bool,

    /// Process only IPv6 prefixes
    #[arg(short = '6', long)]
    only_v6: bool,

    /// Print reduction statistics to stderr
    #[arg(short = 'v', long)]
    print_stats: bool,

    /// Also write the statistics as JSON to this file
    #[arg(long, value_name = "PATH")]
    stats_json: Option<PathBuf>,

    /// Aggregate with an external command (e.g. "aggregate6") instead of in process
    #[arg(long, value_name = "CMD")]
    aggregator_cmd: Option<String>,

    /// Process the two families one after the other
    #[arg(long)]
    no_parallel: bool,

    /// Print STRING before each entry (sets both --print-prefix-ips and --print-prefix-nets)
    #[arg(long, value_name = "STRING")]
    print_prefix: Option<String>,

    /// Print STRING before single-host entries (/32 or /128)
    #[arg(long, value_name = "STRING")]
    print_prefix_ips: Option<String>,

    /// Print STRING before subnet entries
    #[arg(long, value_name = "STRING")]
    print_prefix_nets: Option<String>,

    /// Print STRING after each entry (sets both --print-suffix-ips and --print-suffix-nets)
    #[arg(long, value_name = "STRING")]
    print_suffix: Option<String>,

    /// Print STRING after single-host entries (/32 or /128)
    #[arg(long, value_name = "STRING")]
    print_suffix_ips: Option<String>,

    /// Print STRING after subnet entries
    #[arg(long, value_name = "STRING")]
    print_suffix_nets: Option<String>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            reduce_pct: self.reduce_pct,
            reduce_entries_min: self.reduce_entries,
            only_v4: self.only_v4,
            only_v6: self.only_v6,
            no_parallel: self.no_parallel,
            aggregator_cmd: self.aggregator_cmd.clone(),
            print_stats: self.print_stats,
            stats_json: self.stats_json.clone(),
            print_prefix: self.print_prefix.clone(),
            print_prefix_ips: self.print_prefix_ips.clone(),
            print_prefix_nets: self.print_prefix_nets.clone(),
            print_suffix: self.print_suffix.clone(),
            print_suffix_ips: self.print_suffix_ips.clone(),
            print_suffix_nets: self.print_suffix_nets.clone(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // stdout carries the prefixes, so logging stays quiet unless stats are asked for
    let default_level = if args.print_stats { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => Config::default(),
    };
    config_loader::apply_overrides(&mut config, &args.overrides())?;
    debug!("Effective configuration: {:?}", config);

    let lines = input::read_sources(&args.files)?;
    let parsed = input::parse_lines(lines.iter().map(String::as_str));
    if parsed.is_empty() {
        info!("No prefixes in input, nothing to do");
        return Ok(());
    }

    let output = match &config.aggregator_cmd {
        Some(cmd) => {
            let aggregator = CommandAggregator::new(cmd).wrap_err("Invalid aggregator command")?;
            orchestrator::run(parsed, &config, &aggregator)?
        }
        None => orchestrator::run(parsed, &config, &RangeMerger)?,
    };

    emit_stats(&config, &output)?;

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let written = output.write_to(&mut out, &config.output)?;
    debug!("Wrote {} entries", written);

    Ok(())
}

fn emit_stats(config: &Config, output: &RunOutput) -> Result<()> {
    if config.print_stats {
        eprintln!("{}", report::generate_text_report(&output.report));
    }
    if let Some(path) = &config.stats_json {
        report::generate_json_report(&output.report, path)?;
    }
    Ok(())
}
