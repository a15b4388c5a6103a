// Wire-level models for the miner control API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Network address of a controlled miner, as supplied by the inventory.
///
/// Opaque to this crate -- it is sent verbatim in `/login` and `/logout`
/// bodies and used as the key for session state. Duplicates in an
/// inventory are processed as independent devices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinerAddr(String);

impl MinerAddr {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MinerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MinerAddr {
    fn from(addr: &str) -> Self {
        Self(addr.to_owned())
    }
}

/// Performance tier applied via `/profileset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Overclock,
    Normal,
    Underclock,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Overclock => "overclock",
            Self::Normal => "normal",
            Self::Underclock => "underclock",
        };
        f.write_str(s)
    }
}

/// Power state applied via `/curtail`, independent of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurtailMode {
    Active,
    Sleep,
}

impl fmt::Display for CurtailMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Sleep => "sleep",
        };
        f.write_str(s)
    }
}

/// Successful `/login` response body.
///
/// `ttl` is an RFC 3339 expiry instant and may be absent -- the API does
/// not guarantee it, and callers must not require it.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub ttl: Option<DateTime<Utc>>,
}

/// Error body shape for non-200 responses: `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

// ── Request bodies ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct AddrBody<'a> {
    pub miner_ip: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileBody<'a> {
    pub token: &'a str,
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub(crate) struct CurtailBody<'a> {
    pub token: &'a str,
    pub mode: CurtailMode,
}
