//! se-cache: fingerprinted on-disk storage for derived EOS tables.
//!
//! Each table lives in its own directory under the store root:
//! `<key>/manifest.json` (fingerprint, kind, shape, timestamp) and
//! `<key>/data.json` (axes and value grids, NaN written as `null`).

pub mod hash;
pub mod store;
pub mod types;

pub use hash::{AxisBounds, Fingerprint};
pub use store::TableStore;
pub use types::*;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cached table not found: {key}")]
    NotFound { key: String },

    #[error("Invalid cache key: {key:?}")]
    InvalidKey { key: String },

    #[error("Cached table {key} is stale: expected fingerprint {expected}, found {found}")]
    StaleTable {
        key: String,
        expected: String,
        found: String,
    },

    #[error("Cached table {key} is corrupt: {what}")]
    Corrupt { key: String, what: String },
}
