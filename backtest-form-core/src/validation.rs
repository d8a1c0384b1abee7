//! Validation stages that run in front of the submission controller.
//!
//! `input_issues` holds the rules the input controls enforce before submit is
//! allowed: every field mandatory, values are decimal text, dates are
//! `YYYY-MM-DD`. `cross_field_issues` is a separate, opt-in stage (date order,
//! repeated indicators). Neither is called by `SubmissionController`.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

use crate::domain::{FormState, ParamField, ScalarField};

/// The form input an issue points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    Scalar(ScalarField),
    Param { row: usize, field: ParamField },
}

impl fmt::Display for FieldTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldTarget::Scalar(field) => write!(f, "{field}"),
            FieldTarget::Param { row, field } => write!(f, "parameters[{row}].{field}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub target: FieldTarget,
    pub message: String,
}

impl ValidationIssue {
    fn new(target: FieldTarget, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.target, self.message)
    }
}

/// Parse a calendar date in strict `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Decimal text of any precision: optional sign, digits with an optional
/// fractional part, optional exponent. `12`, `-0.5`, `.25`, `1e-3` are accepted.
pub fn is_decimal_text(s: &str) -> bool {
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return false;
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
    }
}

/// Mandatory-field and format rules, in form order.
pub fn input_issues(form: &FormState) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for field in ScalarField::ALL {
        let target = FieldTarget::Scalar(field);
        let value = form.scalar(field);
        if value.trim().is_empty() {
            issues.push(ValidationIssue::new(target, format!("{} is required", field.label())));
        } else if field.is_date() && parse_date(value).is_none() {
            issues.push(ValidationIssue::new(target, "expected a date as YYYY-MM-DD"));
        }
    }

    for (row, param) in form.parameters().iter().enumerate() {
        if param.indicator_id.is_empty() {
            issues.push(ValidationIssue::new(
                FieldTarget::Param { row, field: ParamField::IndicatorId },
                "select an indicator",
            ));
        }
        let target = FieldTarget::Param { row, field: ParamField::Value };
        if param.value.trim().is_empty() {
            issues.push(ValidationIssue::new(target, "value is required"));
        } else if !is_decimal_text(param.value.trim()) {
            issues.push(ValidationIssue::new(target, "value must be a number"));
        }
    }

    issues
}

/// Optional cross-field rules: start date not after end date, and each
/// indicator used at most once.
pub fn cross_field_issues(form: &FormState) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let start = parse_date(form.scalar(ScalarField::StartDate));
    let end = parse_date(form.scalar(ScalarField::EndDate));
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            issues.push(ValidationIssue::new(
                FieldTarget::Scalar(ScalarField::EndDate),
                format!("end date {end} is before start date {start}"),
            ));
        }
    }

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (row, param) in form.parameters().iter().enumerate() {
        if param.indicator_id.is_empty() {
            continue;
        }
        if let Some(first) = first_seen.get(param.indicator_id.as_str()) {
            issues.push(ValidationIssue::new(
                FieldTarget::Param { row, field: ParamField::IndicatorId },
                format!("indicator '{}' already used in row {first}", param.indicator_id),
            ));
        } else {
            first_seen.insert(param.indicator_id.as_str(), row);
        }
    }

    issues
}

/// Input rules, then the cross-field stage when enabled.
pub fn check(form: &FormState, cross_field: bool) -> Vec<ValidationIssue> {
    let mut issues = input_issues(form);
    if cross_field {
        issues.extend(cross_field_issues(form));
    }
    issues
}
