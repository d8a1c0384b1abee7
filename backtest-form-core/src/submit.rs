//! Submission controller: compose, send, then reset on success.
//!
//! The controller performs no validation of its own. Required fields are the
//! presentation layer's job (see `validation`). The create call is treated as
//! atomic: it either succeeds and the form is reset, or it fails and the form
//! is left exactly as the user entered it.

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::api::{ApiError, BacktestApi, BearerToken};
use crate::domain::{BacktestRequest, FormState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    InFlight,

    #[error("error creating backtest: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Default)]
pub struct SubmissionController {
    in_flight: bool,
    last_created: Option<Value>,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// The record returned by the most recent successful submit.
    pub fn last_created(&self) -> Option<&Value> {
        self.last_created.as_ref()
    }

    /// Mark a submit as started and return the payload to send.
    pub fn begin(&mut self, form: &FormState) -> Result<BacktestRequest, SubmitError> {
        if self.in_flight {
            return Err(SubmitError::InFlight);
        }
        self.in_flight = true;
        Ok(form.compose_request())
    }

    /// Settle a submit started with `begin`.
    ///
    /// Only a confirmed success resets the form.
    pub fn finish(
        &mut self,
        form: &mut FormState,
        outcome: Result<Value, ApiError>,
    ) -> Result<Value, SubmitError> {
        self.in_flight = false;
        match outcome {
            Ok(created) => {
                info!(record = %created, "backtest created");
                self.last_created = Some(created.clone());
                form.reset();
                Ok(created)
            }
            Err(e) => {
                error!(error = %e, "error creating backtest");
                Err(SubmitError::Api(e))
            }
        }
    }

    /// Blocking submit: compose, send, settle.
    pub fn submit<A: BacktestApi + ?Sized>(
        &mut self,
        api: &A,
        token: &BearerToken,
        form: &mut FormState,
    ) -> Result<Value, SubmitError> {
        let request = self.begin(form)?;
        let outcome = api.create_backtest(token, &request);
        self.finish(form, outcome)
    }
}
