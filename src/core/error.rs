//! Provider error taxonomy
//!
//! Every upstream failure reduces to one of these variants. The resolver
//! treats `RateLimited` specially (short-circuit to synthetic data); all
//! other variants mean "try the next provider in the chain".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no quote found for symbol")]
    NoQuote,
}

impl ProviderError {
    /// Classify an HTTP status code. 429 signals global quota exhaustion
    /// rather than a per-request failure.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => ProviderError::RateLimited,
            code => ProviderError::Status(code),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::MalformedResponse(err.to_string())
        } else {
            ProviderError::Connect(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::MalformedResponse(err.to_string())
    }
}
