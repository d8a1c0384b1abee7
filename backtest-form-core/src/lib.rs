//! Backtest Form Core: the state and plumbing behind the backtest entry form.
//!
//! This crate contains everything a front-end needs to collect and submit a
//! backtest request:
//! - Domain types (coins, indicators, parameter rows, the request payload)
//! - The parameter list and form state stores
//! - Reference catalog loading with stale-response protection
//! - The submission controller
//! - Input-boundary and optional cross-field validation
//! - Client configuration and the HTTP service client

pub mod api;
pub mod config;
pub mod domain;
pub mod loader;
pub mod submit;
pub mod validation;

pub use api::{ApiError, BacktestApi, BearerToken, HttpBacktestApi};
pub use config::{ClientConfig, ConfigError};
pub use domain::{
    BacktestRequest, CatalogId, Catalogs, Coin, FormError, FormState, Indicator, ParamField,
    ParameterList, ParameterRow, ScalarField,
};
pub use loader::{ApplyOutcome, CatalogKind, CatalogUpdate, LoadTicket, ReferenceDataLoader};
pub use submit::{SubmissionController, SubmitError};
pub use validation::{FieldTarget, ValidationIssue};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the TUI worker moves across threads is Send.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<BacktestRequest>();
        require_sync::<BacktestRequest>();
        require_send::<CatalogUpdate>();
        require_send::<LoadTicket>();
        require_send::<ApiError>();
        require_send::<FormState>();
        require_sync::<FormState>();
        require_send::<HttpBacktestApi>();
        require_sync::<HttpBacktestApi>();
    }
}
