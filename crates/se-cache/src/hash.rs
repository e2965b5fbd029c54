//! Content fingerprints for derived tables.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Bumped whenever the on-disk layout or a builder's semantics change.
pub const FORMAT_VERSION: u32 = 1;

/// Bounds and resolution of one grid axis (or axis segment).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl AxisBounds {
    pub fn new(start: f64, end: f64, points: usize) -> Self {
        Self { start, end, points }
    }
}

/// SHA-256 fingerprint identifying what a cached table was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint over the source material, the table kind and its grid.
    pub fn compute(material_digest: &str, kind: &str, axes: &[AxisBounds]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(FORMAT_VERSION.to_le_bytes());
        hasher.update(material_digest.as_bytes());
        hasher.update([0u8]);
        hasher.update(kind.as_bytes());
        hasher.update([0u8]);
        for axis in axes {
            hasher.update(axis.start.to_bits().to_le_bytes());
            hasher.update(axis.end.to_bits().to_le_bytes());
            hasher.update((axis.points as u64).to_le_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
