//! Row-level normalization errors.
//!
//! These never abort a load. The offending row is dropped and counted in
//! the table's [`TableReport`](super::TableReport).

/// Why a single record could not become a typed entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// A required column is absent or empty
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// A required numeric column does not hold a finite number
    #[error("field `{field}` is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// A required date column is not in `YYYYMMDD` form
    #[error("field `{field}` is not a valid date: {value:?}")]
    InvalidDate { field: &'static str, value: String },
}
