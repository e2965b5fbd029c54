//! Table construction and lookup errors.

use se_core::CoreError;
use thiserror::Error;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Errors that can occur while building or querying tables.
///
/// Lookups outside a table's domain are not errors: they return NaN.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// Raw data violates a structural invariant (ordering, array sizes).
    #[error("Invalid table data: {what}")]
    InvalidTable { what: String },

    /// Two coordinate sequences (or a grid and its values) disagree in length.
    #[error("Shape mismatch for {what}: {left} vs {right}")]
    ShapeMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}
