//! HTTP implementation of `BacktestApi` over `reqwest::blocking`.
//!
//! One attempt per call: no retries, no backoff. Callers that must not block
//! run these methods on a worker thread.

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ApiError, BacktestApi, BearerToken};
use crate::config::ClientConfig;
use crate::domain::{BacktestRequest, Coin, Indicator};

/// `GET /coins` response body.
#[derive(Debug, Deserialize)]
struct CoinsEnvelope {
    coins: Vec<Coin>,
}

/// `GET /indicators` response body.
#[derive(Debug, Deserialize)]
struct IndicatorsEnvelope {
    indicators: Vec<Indicator>,
}

pub struct HttpBacktestApi {
    client: Client,
    config: ClientConfig,
}

impl HttpBacktestApi {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config
            .validate()
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &BearerToken,
    ) -> Result<T, ApiError> {
        let url = self.config.endpoint(path);
        debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token.expose())
            .send()
            .map_err(transport_error)?;
        let body = success_body(resp)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }
}

impl BacktestApi for HttpBacktestApi {
    fn fetch_coins(&self, token: &BearerToken) -> Result<Vec<Coin>, ApiError> {
        let envelope: CoinsEnvelope = self.get_json("coins", token)?;
        Ok(envelope.coins)
    }

    fn fetch_indicators(&self, token: &BearerToken) -> Result<Vec<Indicator>, ApiError> {
        let envelope: IndicatorsEnvelope = self.get_json("indicators", token)?;
        Ok(envelope.indicators)
    }

    fn create_backtest(
        &self,
        token: &BearerToken,
        request: &BacktestRequest,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.config.endpoint("backtests");
        debug!(%url, name = %request.name, rows = request.parameters.len(), "POST");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token.expose())
            .json(request)
            .send()
            .map_err(transport_error)?;
        let body = success_body(resp)?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("backtests: {e}")))
    }
}

/// Read the body of a 2xx response, or turn any other status into `ApiError::Status`.
fn success_body(resp: Response) -> Result<String, ApiError> {
    let status = resp.status();
    let body = resp.text().map_err(transport_error)?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_builder() {
        ApiError::InvalidUrl(e.to_string())
    } else if e.is_decode() {
        ApiError::Decode(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}
