// Outcome classification for a single logical API request.
//
// The original control flow signalled "ignored" by rewriting the HTTP
// status on the response object; here each terminal state is an explicit
// variant so callers match instead of sniffing status codes.

use serde_json::Value;

/// Classified result of one logical API call (after retries).
///
/// This is the contract between the request executor and its callers:
/// every call ends in exactly one of these states.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// HTTP 200 with the parsed JSON body.
    Success(Value),

    /// 401-class response while `relogin_on_unauthorized` was set.
    /// Recovery (re-login and a single retry) is the caller's job.
    Unauthorized,

    /// The server rejected the request with a message the caller asked
    /// to ignore (e.g. the mode is already set). Terminal, not a failure,
    /// and never retried.
    Ignored(String),

    /// All attempts exhausted; carries a description of the last error.
    Failed(String),
}

impl RequestOutcome {
    /// Returns `true` for outcomes that count as the operation taking
    /// effect: a real success or an ignorable "already set" rejection.
    pub fn is_effective(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Ignored(_))
    }
}
