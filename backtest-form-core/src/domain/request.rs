use serde::{Deserialize, Serialize};

use super::params::ParameterRow;

/// Payload for `POST /backtests`.
///
/// Built fresh from the form on every submit attempt and dropped once the
/// request resolves. Parameter values travel as the text the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub coin: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub parameters: Vec<ParameterRow>,
}
