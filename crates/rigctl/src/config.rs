//! CLI-owned configuration: TOML file, env overrides, and translation
//! to `rigctl_core::FleetConfig`.
//!
//! Precedence: CLI flags > `RIGCTL_*` env vars > config file > defaults.
//! Core never sees these types -- it receives a pre-built `FleetConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use rigctl_core::{FleetConfig, MinerAddr};

use crate::cli::Cli;
use crate::error::CliError;

// ── TOML config struct ──────────────────────────────────────────────

/// On-disk configuration. Every field has a CLI flag counterpart.
#[derive(Debug, Deserialize, Serialize)]
pub struct FileConfig {
    /// Base URL of the miner control API.
    pub base_url: Option<String>,

    /// Inline inventory of miner addresses.
    #[serde(default)]
    pub miners: Vec<String>,

    /// File with one miner address per line.
    pub miners_file: Option<PathBuf>,

    /// Maximum concurrent device cycles.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Attempts per API call.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Stop after this many cycles (absent: run forever).
    pub cycles: Option<u64>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Log sink file (absent: stderr).
    pub log_file: Option<PathBuf>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            miners: Vec::new(),
            miners_file: None,
            workers: default_workers(),
            retries: default_retries(),
            cycles: None,
            timeout: default_timeout(),
            log_file: None,
        }
    }
}

fn default_workers() -> usize {
    rigctl_core::config::DEFAULT_MAX_WORKERS
}
fn default_retries() -> u32 {
    rigctl_core::config::DEFAULT_MAX_ATTEMPTS
}
fn default_timeout() -> u64 {
    rigctl_core::config::DEFAULT_TIMEOUT.as_secs()
}

/// Platform config file location (`.../rigctl/config.toml`).
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rigctl").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the layered file/env configuration.
///
/// An explicitly passed path must exist; the default path is merged
/// only when present.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig, CliError> {
    let mut figment = Figment::from(Serialized::defaults(FileConfig::default()));

    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            figment = figment.merge(Toml::file(path));
        }
        None => {
            if let Some(path) = config_path().filter(|p| p.exists()) {
                figment = figment.merge(Toml::file(path));
            }
        }
    }

    figment
        .merge(Env::prefixed("RIGCTL_"))
        .extract()
        .map_err(|e| CliError::Config {
            message: e.to_string(),
        })
}

// ── Resolution ──────────────────────────────────────────────────────

/// Fully resolved runtime settings.
#[derive(Debug)]
pub struct Resolved {
    pub fleet: FleetConfig,
    pub log_file: Option<PathBuf>,
}

/// Merge the config file, env vars, and CLI flags into a `FleetConfig`.
pub fn resolve(cli: &Cli) -> Result<Resolved, CliError> {
    let file = load(cli.config.as_deref())?;

    let base_url_str = cli
        .base_url
        .clone()
        .or(file.base_url)
        .ok_or(CliError::NoBaseUrl)?;
    let base_url: url::Url = base_url_str.parse().map_err(|_| CliError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {base_url_str}"),
    })?;

    // Flags replace the file's inline list; a miners file appends.
    let mut miners: Vec<String> = if cli.miners.is_empty() {
        file.miners
    } else {
        cli.miners.clone()
    };
    if let Some(path) = cli.miners_file.as_ref().or(file.miners_file.as_ref()) {
        miners.extend(read_miners_file(path)?);
    }
    if miners.is_empty() {
        return Err(CliError::NoInventory);
    }

    let workers = cli.workers.unwrap_or(file.workers);
    if workers == 0 {
        return Err(CliError::Validation {
            field: "workers".into(),
            reason: "must be at least 1".into(),
        });
    }

    let retries = cli.retries.unwrap_or(file.retries);
    if retries == 0 {
        return Err(CliError::Validation {
            field: "retries".into(),
            reason: "must be at least 1".into(),
        });
    }

    let mut fleet = FleetConfig::new(base_url, miners.into_iter().map(MinerAddr::new).collect());
    fleet.max_workers = workers;
    fleet.max_attempts = retries;
    fleet.cycles = cli.cycles.or(file.cycles);
    fleet.timeout = Duration::from_secs(cli.timeout.unwrap_or(file.timeout));

    Ok(Resolved {
        fleet,
        log_file: cli.log_file.clone().or(file.log_file),
    })
}

/// Read an inventory file: one address per line, blank lines and
/// `#`-comments skipped.
fn read_miners_file(path: &Path) -> Result<Vec<String>, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::MinersFile {
        path: path.display().to_string(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect())
}
