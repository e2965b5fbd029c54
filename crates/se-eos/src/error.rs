//! EOS engine errors.

use se_cache::CacheError;
use se_core::MaterialId;
use se_solver::SolverError;
use se_tables::TableError;
use thiserror::Error;

/// Result type for EOS operations.
pub type EosResult<T> = Result<T, EosError>;

/// Errors surfaced to callers of the EOS engine.
///
/// Domain-boundary inputs and non-convergent table cells are not errors: they
/// propagate as NaN values.
#[derive(Error, Debug)]
pub enum EosError {
    /// The query does not name a supported pair of independent variables.
    #[error("Under-specified query: given {given}; need (rho, u), (rho, T) or (P, S)")]
    UnderSpecified { given: String },

    /// Round-trip consistency check exceeded its tolerance.
    #[error(
        "Consistency check failed for {variable} at index {index}: fractional error {error:.3e} >= {tolerance}"
    )]
    ConsistencyCheck {
        variable: &'static str,
        index: usize,
        error: f64,
        tolerance: f64,
    },

    /// Query inputs of different lengths.
    #[error("Length mismatch: {what} has {found} values, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Unknown material: {id}")]
    UnknownMaterial { id: MaterialId },

    #[error("Configuration error: {what}")]
    Config { what: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EosError::ConsistencyCheck {
            variable: "density",
            index: 3,
            error: 0.25,
            tolerance: 0.1,
        };
        let msg = err.to_string();
        assert!(msg.contains("density"));
        assert!(msg.contains("index 3"));

        let err = EosError::UnderSpecified {
            given: "T, P".to_string(),
        };
        assert!(err.to_string().contains("T, P"));
    }

    #[test]
    fn table_errors_convert() {
        let err: EosError = TableError::InvalidArg { what: "bad axis" }.into();
        assert!(matches!(err, EosError::Table(_)));
    }
}
