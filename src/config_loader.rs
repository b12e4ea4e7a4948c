use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Command-line values that override the file configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub reduce_pct: Option<f64>,
    pub reduce_entries_min: Option<u64>,
    pub only_v4: bool,
    pub only_v6: bool,
    pub no_parallel: bool,
    pub aggregator_cmd: Option<String>,
    pub print_stats: bool,
    pub stats_json: Option<std::path::PathBuf>,
    pub print_prefix: Option<String>,
    pub print_prefix_ips: Option<String>,
    pub print_prefix_nets: Option<String>,
    pub print_suffix: Option<String>,
    pub print_suffix_ips: Option<String>,
    pub print_suffix_nets: Option<String>,
}

/// Apply CLI overrides to a configuration.
///
/// The combined `print_prefix` / `print_suffix` values win over the
/// per-kind ones.
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(pct) = overrides.reduce_pct {
        config.reduce.reduce_pct = pct;
    }
    if let Some(min) = overrides.reduce_entries_min {
        config.reduce.reduce_entries_min = min;
    }

    if overrides.only_v4 {
        config.family = crate::config::FamilyFilter::Ipv4;
    } else if overrides.only_v6 {
        config.family = crate::config::FamilyFilter::Ipv6;
    }

    if overrides.no_parallel {
        config.parallel = false;
    }
    if let Some(cmd) = &overrides.aggregator_cmd {
        config.aggregator_cmd = Some(cmd.clone());
    }
    if overrides.print_stats {
        config.print_stats = true;
    }
    if let Some(path) = &overrides.stats_json {
        config.stats_json = Some(path.clone());
    }

    let output = &mut config.output;
    if let Some(value) = &overrides.print_prefix_ips {
        output.prefix_ips = value.clone();
    }
    if let Some(value) = &overrides.print_prefix_nets {
        output.prefix_nets = value.clone();
    }
    if let Some(value) = &overrides.print_suffix_ips {
        output.suffix_ips = value.clone();
    }
    if let Some(value) = &overrides.print_suffix_nets {
        output.suffix_nets = value.clone();
    }
    if let Some(value) = &overrides.print_prefix {
        output.set_prefix(value);
    }
    if let Some(value) = &overrides.print_suffix {
        output.set_suffix(value);
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
