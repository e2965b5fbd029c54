use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Scalar validation failures shared by the table and engine crates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },
}
