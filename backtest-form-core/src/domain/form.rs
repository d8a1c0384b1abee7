//! Form state: the four scalar fields plus the parameter list.

use std::fmt;
use std::str::FromStr;

use super::error::FormError;
use super::params::{ParamField, ParameterList};
use super::request::BacktestRequest;

/// Scalar (non-repeating) field of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    Coin,
    Name,
    StartDate,
    EndDate,
}

impl ScalarField {
    pub const ALL: [ScalarField; 4] = [
        ScalarField::Coin,
        ScalarField::Name,
        ScalarField::StartDate,
        ScalarField::EndDate,
    ];

    /// Wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            ScalarField::Coin => "coin",
            ScalarField::Name => "name",
            ScalarField::StartDate => "start_date",
            ScalarField::EndDate => "end_date",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScalarField::Coin => "Coin",
            ScalarField::Name => "Name",
            ScalarField::StartDate => "Start Date",
            ScalarField::EndDate => "End Date",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(self, ScalarField::StartDate | ScalarField::EndDate)
    }
}

impl fmt::Display for ScalarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

/// Everything the user has entered so far.
///
/// `FormState::default()` is the initial state: every scalar empty and a single
/// blank parameter row. No cross-field rules are enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    coin: String,
    name: String,
    start_date: String,
    end_date: String,
    parameters: ParameterList,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalar(&self, field: ScalarField) -> &str {
        match field {
            ScalarField::Coin => &self.coin,
            ScalarField::Name => &self.name,
            ScalarField::StartDate => &self.start_date,
            ScalarField::EndDate => &self.end_date,
        }
    }

    /// Replace one scalar field.
    pub fn set_scalar_field(&mut self, field: ScalarField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ScalarField::Coin => self.coin = value,
            ScalarField::Name => self.name = value,
            ScalarField::StartDate => self.start_date = value,
            ScalarField::EndDate => self.end_date = value,
        }
    }

    pub fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    pub fn append_row(&mut self) {
        self.parameters.append_row();
    }

    pub fn update_param_field(
        &mut self,
        index: usize,
        field: ParamField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        self.parameters.update_field(index, field, value)
    }

    /// Snapshot the current state as a request payload. Pure.
    pub fn compose_request(&self) -> BacktestRequest {
        BacktestRequest {
            coin: self.coin.clone(),
            name: self.name.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            parameters: self.parameters.to_rows(),
        }
    }

    /// Back to the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_initial(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParameterRow;

    #[test]
    fn initial_state() {
        let form = FormState::new();
        for field in ScalarField::ALL {
            assert_eq!(form.scalar(field), "");
        }
        assert_eq!(form.parameters().len(), 1);
        assert!(form.parameters().get(0).unwrap().is_blank());
        assert!(form.is_initial());
    }

    #[test]
    fn set_scalar_only_touches_that_field() {
        let mut form = FormState::new();
        form.set_scalar_field(ScalarField::Name, "Test");
        assert_eq!(form.scalar(ScalarField::Name), "Test");
        assert_eq!(form.scalar(ScalarField::Coin), "");
        assert!(!form.is_initial());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut form = FormState::new();
        form.set_scalar_field(ScalarField::Coin, "ETH");
        form.append_row();
        form.update_param_field(1, ParamField::Value, "3").unwrap();
        form.reset();
        assert_eq!(form, FormState::default());
    }

    #[test]
    fn compose_copies_rows_in_order() {
        let mut form = FormState::new();
        form.update_param_field(0, ParamField::IndicatorId, "a").unwrap();
        form.append_row();
        form.update_param_field(1, ParamField::IndicatorId, "b").unwrap();
        let req = form.compose_request();
        assert_eq!(
            req.parameters,
            vec![ParameterRow::new("a", ""), ParameterRow::new("b", "")]
        );
    }

    #[test]
    fn scalar_names_parse() {
        for field in ScalarField::ALL {
            assert_eq!(field.name().parse::<ScalarField>().unwrap(), field);
        }
        assert!("parameters".parse::<ScalarField>().is_err());
    }
}
