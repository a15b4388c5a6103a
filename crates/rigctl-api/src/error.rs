use thiserror::Error;

/// Top-level error type for the `rigctl-api` crate.
///
/// Per-request failures never surface as `Error` -- the executor folds
/// them into [`RequestOutcome`](crate::RequestOutcome) so callers get a
/// classification rather than a bare error. `Error` covers only the
/// failures outside the retry loop: client construction and URL
/// handling.
#[derive(Debug, Error)]
pub enum Error {
    /// Base URL or endpoint path could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to construct the underlying HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}
