// ── Runtime fleet configuration ──
//
// Describes *what* to control and with which tuning. The CLI builds one
// of these from its config file / flags and hands it in; core never
// touches disk.

use std::time::Duration;

use url::Url;

use rigctl_api::MinerAddr;

pub const DEFAULT_MAX_WORKERS: usize = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for one fleet control loop.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Base URL of the miner control API (e.g. `http://127.0.0.1:5000/api`).
    pub base_url: Url,
    /// Inventory of device addresses. Order is preserved; duplicates are
    /// processed independently.
    pub miners: Vec<MinerAddr>,
    /// Maximum concurrent device cycles per batch.
    pub max_workers: usize,
    /// Attempts per API call before it is declared failed.
    pub max_attempts: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Stop after this many completed cycles. `None` runs forever.
    pub cycles: Option<u64>,
}

impl FleetConfig {
    pub fn new(base_url: Url, miners: Vec<MinerAddr>) -> Self {
        Self {
            base_url,
            miners,
            max_workers: DEFAULT_MAX_WORKERS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT,
            cycles: None,
        }
    }
}
