// ── Session manager ──
//
// Owns per-device auth tokens. Every cycle logs in fresh and logs out at
// the end; the stored TTL is informational and never consulted before
// use. The token map is the only shared mutable state in the system.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{error, info, warn};

use rigctl_api::{LoginResponse, MinerAddr, MinerClient, RequestOutcome};

/// A live session credential for one miner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub value: String,
    /// Expiry reported by the API, if any. Absence is not an error.
    pub ttl: Option<DateTime<Utc>>,
}

/// Per-device login/logout driver and token store.
///
/// A miner has at most one live token; each successful login overwrites
/// the previous entry, and logout removes it. Entry updates are atomic
/// per key (sharded locking in the map), which is all the invariant
/// requires -- devices are independent.
pub struct SessionManager {
    client: Arc<MinerClient>,
    tokens: DashMap<MinerAddr, SessionToken>,
    max_attempts: u32,
}

impl SessionManager {
    pub fn new(client: Arc<MinerClient>, max_attempts: u32) -> Self {
        Self {
            client,
            tokens: DashMap::new(),
            max_attempts,
        }
    }

    /// Authenticate with a miner and store the returned token.
    ///
    /// Returns `None` (with the failure logged) if the call failed after
    /// retries or the response carried no usable token. A response
    /// without a `ttl` still succeeds.
    pub async fn login(&self, miner: &MinerAddr) -> Option<SessionToken> {
        let outcome = self.client.login(miner, self.max_attempts).await;

        let payload = match outcome {
            RequestOutcome::Success(payload) => payload,
            RequestOutcome::Failed(reason) => {
                error!(%miner, attempts = self.max_attempts, %reason, "login failed");
                return None;
            }
            other => {
                error!(%miner, outcome = ?other, "unexpected login outcome");
                return None;
            }
        };

        let parsed: LoginResponse = match serde_json::from_value(payload) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(%miner, error = %e, "malformed login response");
                return None;
            }
        };

        match parsed.token {
            Some(value) if !value.is_empty() => {
                let token = SessionToken {
                    value,
                    ttl: parsed.ttl,
                };
                self.tokens.insert(miner.clone(), token.clone());
                info!(%miner, "logged in");
                Some(token)
            }
            _ => {
                error!(%miner, "login response did not contain a token");
                None
            }
        }
    }

    /// Log out from a miner and drop its stored token.
    ///
    /// Idempotent from the caller's perspective: a missing stored token
    /// is not an error. On failure the token is left in place and the
    /// failure is logged. Returns whether the logout took effect.
    pub async fn logout(&self, miner: &MinerAddr) -> bool {
        let outcome = self.client.logout(miner, self.max_attempts).await;

        if outcome.is_effective() {
            self.tokens.remove(miner);
            info!(%miner, "logged out");
            true
        } else {
            warn!(%miner, attempts = self.max_attempts, "logout failed, token retained");
            false
        }
    }

    /// The currently stored token for a miner, if any.
    pub fn token(&self, miner: &MinerAddr) -> Option<SessionToken> {
        self.tokens.get(miner).map(|entry| entry.value().clone())
    }

    /// Number of live sessions.
    pub fn live_sessions(&self) -> usize {
        self.tokens.len()
    }
}
