// Miner control API HTTP client
//
// Wraps `reqwest::Client` with the retry/backoff/classification policy
// shared by every endpoint. Endpoint wrappers (login, logout, setters)
// are implemented as inherent methods in `endpoints.rs` to keep this
// module focused on transport mechanics.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::Error;
use crate::model::ErrorBody;
use crate::outcome::RequestOutcome;
use crate::transport::TransportConfig;

/// Per-call policy for the request executor.
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions {
    /// Total number of attempts (not retries) before giving up.
    pub max_attempts: u32,
    /// Return [`RequestOutcome::Unauthorized`] on HTTP 401 instead of
    /// retrying, so the caller can re-login and retry once.
    pub relogin_on_unauthorized: bool,
    /// Error-message substrings that terminate the call as
    /// [`RequestOutcome::Ignored`] instead of counting as a failure.
    pub ignorable_errors: &'static [&'static str],
}

impl RequestOptions {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            relogin_on_unauthorized: false,
            ignorable_errors: &[],
        }
    }
}

/// Raw HTTP client for the miner control API.
///
/// All endpoints are JSON-over-POST against a single base path. The
/// client is cheap to clone (reqwest pools connections internally) and
/// holds no per-device state -- session tokens live one layer up.
#[derive(Debug, Clone)]
pub struct MinerClient {
    http: reqwest::Client,
    base_url: Url,
    backoff_unit: Duration,
}

impl MinerClient {
    /// Create a new client for the API rooted at `base_url`
    /// (e.g. `http://127.0.0.1:5000/api`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            backoff_unit: transport.backoff_unit,
        })
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL for an endpoint: `{base}/{endpoint}`.
    fn api_url(&self, endpoint: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint
        );
        Url::parse(&full).map_err(Error::InvalidUrl)
    }

    /// Send one logical POST request, retrying with exponential backoff,
    /// and classify the result.
    ///
    /// Terminal states short-circuit the retry loop: a 200 returns
    /// `Success`, an ignorable error message returns `Ignored`, and a 401
    /// with `relogin_on_unauthorized` returns `Unauthorized`. Transport
    /// errors and other non-200 responses consume an attempt and wait
    /// `backoff_unit * 2^attempt` before the next try. Exhausting all
    /// attempts yields `Failed` with the last error seen.
    pub async fn execute(
        &self,
        endpoint: &str,
        body: &impl Serialize,
        options: &RequestOptions,
    ) -> RequestOutcome {
        let url = match self.api_url(endpoint) {
            Ok(url) => url,
            Err(e) => return RequestOutcome::Failed(e.to_string()),
        };

        let mut last_error = String::from("no attempts made");

        for attempt in 0..options.max_attempts {
            if attempt > 0 {
                let delay = self.backoff_unit * 2u32.saturating_pow(attempt - 1);
                debug!(endpoint, attempt, ?delay, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            debug!(endpoint, attempt, %url, "POST");

            let resp = match self.http.post(url.clone()).json(body).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(endpoint, attempt, error = %e, "transport error, will retry");
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = resp.status();
            debug!(endpoint, attempt, status = status.as_u16(), "response received");

            if status == StatusCode::OK {
                match resp.json::<Value>().await {
                    Ok(payload) => return RequestOutcome::Success(payload),
                    Err(e) => {
                        warn!(endpoint, attempt, error = %e, "200 response with unreadable body");
                        last_error = format!("unreadable 200 body: {e}");
                        continue;
                    }
                }
            }

            let text = match resp.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!(endpoint, attempt, error = %e, "failed to read error body");
                    last_error = e.to_string();
                    continue;
                }
            };

            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or_default();

            if !message.is_empty()
                && options.ignorable_errors.iter().any(|s| message.contains(s))
            {
                info!(endpoint, %message, "ignoring error, no retry will be performed");
                return RequestOutcome::Ignored(message);
            }

            if status == StatusCode::UNAUTHORIZED && options.relogin_on_unauthorized {
                warn!(endpoint, attempt, "unauthorized, deferring recovery to caller");
                return RequestOutcome::Unauthorized;
            }

            warn!(
                endpoint,
                attempt,
                status = status.as_u16(),
                body = %text,
                "request failed"
            );
            last_error = format!("HTTP {}: {}", status.as_u16(), text);
        }

        error!(
            endpoint,
            attempts = options.max_attempts,
            %last_error,
            "request failed after all attempts"
        );
        RequestOutcome::Failed(last_error)
    }
}
