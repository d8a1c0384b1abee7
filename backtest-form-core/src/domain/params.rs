//! Parameter rows and the ordered, growable list that owns them.
//!
//! Rows have no identity of their own: a row is addressed by its position.
//! This holds only because rows are never removed or reordered. Adding either
//! operation requires switching to stable per-row tokens first.
//!
//! Each row lives behind an `Arc`. Cloning the list yields a snapshot that
//! shares every row allocation, and an edit swaps exactly one `Arc`, so rows
//! that were not edited compare pointer-equal across snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::error::FormError;

/// One indicator/value pair. Empty strings mean "not yet entered".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterRow {
    pub indicator_id: String,
    pub value: String,
}

impl ParameterRow {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn new(indicator_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            indicator_id: indicator_id.into(),
            value: value.into(),
        }
    }

    pub fn field(&self, field: ParamField) -> &str {
        match field {
            ParamField::IndicatorId => &self.indicator_id,
            ParamField::Value => &self.value,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.indicator_id.is_empty() && self.value.is_empty()
    }
}

/// Editable field of a parameter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    IndicatorId,
    Value,
}

impl ParamField {
    pub const ALL: [ParamField; 2] = [ParamField::IndicatorId, ParamField::Value];

    /// Wire name of the field.
    pub fn name(self) -> &'static str {
        match self {
            ParamField::IndicatorId => "indicator_id",
            ParamField::Value => "value",
        }
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "indicator_id" => Ok(ParamField::IndicatorId),
            "value" => Ok(ParamField::Value),
            other => Err(FormError::UnknownField(other.to_string())),
        }
    }
}

/// Ordered parameter rows. Never empty: a single blank row is the minimum.
#[derive(Debug, Clone)]
pub struct ParameterList {
    rows: Vec<Arc<ParameterRow>>,
}

impl Default for ParameterList {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterList {
    /// A list holding one blank row.
    pub fn new() -> Self {
        Self {
            rows: vec![Arc::new(ParameterRow::blank())],
        }
    }

    /// Build a list from existing rows. An empty input yields one blank row.
    pub fn from_rows(rows: impl IntoIterator<Item = ParameterRow>) -> Self {
        let rows: Vec<Arc<ParameterRow>> = rows.into_iter().map(Arc::new).collect();
        if rows.is_empty() {
            Self::new()
        } else {
            Self { rows }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// A list is never empty; see the type docs.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ParameterRow> {
        self.rows.get(index).map(|r| r.as_ref())
    }

    /// Shared handle to a row, for identity comparisons between snapshots.
    pub fn row_handle(&self, index: usize) -> Option<&Arc<ParameterRow>> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterRow> {
        self.rows.iter().map(|r| r.as_ref())
    }

    /// Append one blank row at the end. Existing rows are untouched.
    pub fn append_row(&mut self) {
        self.rows.push(Arc::new(ParameterRow::blank()));
    }

    /// Set one field of the row at `index`.
    ///
    /// Only that row is replaced; every other row keeps its allocation. An
    /// out-of-range index aborts with `RowOutOfBounds` and leaves the list
    /// exactly as it was.
    pub fn update_field(
        &mut self,
        index: usize,
        field: ParamField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let len = self.rows.len();
        let slot = self
            .rows
            .get_mut(index)
            .ok_or(FormError::RowOutOfBounds { index, len })?;

        let mut row = (**slot).clone();
        match field {
            ParamField::IndicatorId => row.indicator_id = value.into(),
            ParamField::Value => row.value = value.into(),
        }
        *slot = Arc::new(row);
        Ok(())
    }

    /// Plain copies of every row, in order.
    pub fn to_rows(&self) -> Vec<ParameterRow> {
        self.iter().cloned().collect()
    }
}

impl PartialEq for ParameterList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for ParameterList {}
