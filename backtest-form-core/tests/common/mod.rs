//! Shared test fixtures: an in-memory service standing in for the real API.

#![allow(dead_code)]

use std::sync::Mutex;

use backtest_form_core::{
    ApiError, BacktestApi, BacktestRequest, BearerToken, Coin, FormState, Indicator, ParamField,
    ScalarField,
};

/// Scripted `BacktestApi`. Records every request it receives.
pub struct MockApi {
    pub coins: Result<Vec<Coin>, ApiError>,
    pub indicators: Result<Vec<Indicator>, ApiError>,
    pub create: Result<serde_json::Value, ApiError>,
    pub created: Mutex<Vec<BacktestRequest>>,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn ok() -> Self {
        Self {
            coins: Ok(vec![coin("1", "BTC", "Bitcoin"), coin("2", "ETH", "Ether")]),
            indicators: Ok(vec![indicator("rsi14", "RSI 14"), indicator("ema20", "EMA 20")]),
            create: Ok(serde_json::json!({"id": 101, "status": "queued"})),
            created: Mutex::new(Vec::new()),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_create(error: ApiError) -> Self {
        Self {
            create: Err(error),
            ..Self::ok()
        }
    }

    pub fn created_requests(&self) -> Vec<BacktestRequest> {
        self.created.lock().unwrap().clone()
    }

    fn record_token(&self, token: &BearerToken) {
        self.tokens_seen.lock().unwrap().push(token.expose().to_string());
    }
}

impl BacktestApi for MockApi {
    fn fetch_coins(&self, token: &BearerToken) -> Result<Vec<Coin>, ApiError> {
        self.record_token(token);
        self.coins.clone()
    }

    fn fetch_indicators(&self, token: &BearerToken) -> Result<Vec<Indicator>, ApiError> {
        self.record_token(token);
        self.indicators.clone()
    }

    fn create_backtest(
        &self,
        token: &BearerToken,
        request: &BacktestRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.record_token(token);
        self.created.lock().unwrap().push(request.clone());
        self.create.clone()
    }
}

pub fn coin(id: &str, symbol: &str, name: &str) -> Coin {
    Coin {
        id: id.into(),
        symbol: symbol.into(),
        name: name.into(),
    }
}

pub fn indicator(id: &str, name: &str) -> Indicator {
    Indicator {
        id: id.into(),
        name: name.into(),
    }
}

/// The BTC/Test/rsi14 form used across scenarios.
pub fn btc_form() -> FormState {
    let mut form = FormState::new();
    form.set_scalar_field(ScalarField::Coin, "BTC");
    form.set_scalar_field(ScalarField::Name, "Test");
    form.set_scalar_field(ScalarField::StartDate, "2024-01-01");
    form.set_scalar_field(ScalarField::EndDate, "2024-06-01");
    form.update_param_field(0, ParamField::IndicatorId, "rsi14").unwrap();
    form.update_param_field(0, ParamField::Value, "30").unwrap();
    form
}
