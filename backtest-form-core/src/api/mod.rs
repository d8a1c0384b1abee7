//! Service client trait and structured error types.
//!
//! The `BacktestApi` trait abstracts over the reference-data and submission
//! services so front-ends can run against the real HTTP client and tests can
//! run against an in-memory mock.

mod http;

pub use http::HttpBacktestApi;

use std::fmt;
use thiserror::Error;

use crate::domain::{BacktestRequest, Coin, Indicator};

/// Bearer credential supplied by the caller. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Structured error types for service calls.
///
/// These are designed to be displayable in both CLI and TUI contexts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Short category tag for status lines and error history.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "network",
            ApiError::Status { .. } => "status",
            ApiError::Decode(_) => "decode",
            ApiError::InvalidUrl(_) => "config",
        }
    }
}

/// The remote operations the form depends on.
pub trait BacktestApi: Send + Sync {
    /// `GET /coins`
    fn fetch_coins(&self, token: &BearerToken) -> Result<Vec<Coin>, ApiError>;

    /// `GET /indicators`
    fn fetch_indicators(&self, token: &BearerToken) -> Result<Vec<Indicator>, ApiError>;

    /// `POST /backtests`. Returns the created record as the service sent it.
    fn create_backtest(
        &self,
        token: &BearerToken,
        request: &BacktestRequest,
    ) -> Result<serde_json::Value, ApiError>;
}
