// ── Core error types ──
//
// User-facing errors from rigctl-core. Per-device failures inside a
// cycle are values (logged outcomes), not errors -- these variants cover
// the failures callers may need to act on.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Login failed after all attempts; the device's cycle is skipped.
    #[error("Authentication failed for miner {miner}: {reason}")]
    AuthFailure { miner: String, reason: String },

    /// A setter or logout step failed after retries (and, for setters,
    /// after the one permitted re-login).
    #[error("Operation {operation} failed for miner {miner}: {reason}")]
    StepFailure {
        miner: String,
        operation: &'static str,
        reason: String,
    },

    /// Invalid fleet configuration (bad URL, empty inventory, etc.)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Wrapped transport-layer error.
    #[error("API error: {0}")]
    Api(#[from] rigctl_api::Error),
}
