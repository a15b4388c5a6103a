//! Command-line definition for the `rigctl` binary.

use std::path::PathBuf;

use clap::Parser;

/// Schedule-driven curtailment controller for miner fleets.
///
/// Once started, rigctl resolves the current time-of-day band, applies
/// the matching curtailment mode and performance profile to every miner
/// in the inventory, then sleeps until the next band transition.
#[derive(Debug, Parser)]
#[command(name = "rigctl", version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (default: the platform config dir).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the miner control API.
    #[arg(long, env = "RIGCTL_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Miner address to control (repeatable).
    #[arg(long, value_name = "ADDR")]
    pub miners: Vec<String>,

    /// File with one miner address per line (`#` starts a comment).
    #[arg(long, value_name = "PATH")]
    pub miners_file: Option<PathBuf>,

    /// Maximum concurrent device cycles.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Attempts per API call before giving up.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Stop after N completed cycles (default: run forever).
    #[arg(long, value_name = "N")]
    pub cycles: Option<u64>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Append logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
