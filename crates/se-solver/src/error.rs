//! Error types for solver operations.

use thiserror::Error;

/// Errors that can occur before a solve starts.
///
/// Failing to converge is not an error; it is reported through the result's
/// `converged` flag.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid solver input: {what}")]
    InvalidInput { what: String },

    #[error("Invalid solver configuration: {what}")]
    InvalidConfig { what: &'static str },
}

pub type SolverResult<T> = Result<T, SolverError>;
