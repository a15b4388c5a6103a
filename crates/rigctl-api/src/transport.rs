// Shared transport configuration for building reqwest::Client instances.
//
// The control API is a plain HTTP JSON service, so this carries only the
// per-request timeout and the retry backoff unit. Tests shrink both to
// keep retry paths fast.

use std::time::Duration;

/// Transport tuning for the miner control API client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout applied to every API call.
    pub timeout: Duration,
    /// Base unit for exponential backoff between retry attempts.
    /// After attempt `i` (0-based) fails, the executor waits
    /// `backoff_unit * 2^i` before the next try.
    pub backoff_unit: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("rigctl/0.1.0")
            .build()
            .map_err(|e| crate::error::Error::ClientBuild(e.to_string()))
    }
}
