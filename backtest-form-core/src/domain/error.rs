use thiserror::Error;

/// Errors raised by the form stores.
///
/// `RowOutOfBounds` is a caller defect, not a user mistake: the operation is
/// aborted and no row is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("parameter row {index} is out of bounds (list has {len} rows)")]
    RowOutOfBounds { index: usize, len: usize },

    #[error("unknown form field: {0}")]
    UnknownField(String),
}
