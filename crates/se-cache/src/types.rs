//! Cached table data types.

use crate::hash::{AxisBounds, Fingerprint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which derived table a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// (S, log10 P) -> (rho, T)
    InverseSp,
    /// (u, log10 rho) -> T
    InverseURho,
    /// (log10 alpha, log10 rho) -> T
    InverseOpacity,
}

impl TableKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::InverseSp => "inverse_sp",
            Self::InverseURho => "inverse_u_rho",
            Self::InverseOpacity => "inverse_opacity",
        }
    }
}

/// Manifest stored next to the table data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableManifest {
    pub key: String,
    pub fingerprint: Fingerprint,
    pub kind: TableKind,
    pub material: String,
    /// RFC 3339 creation time
    pub timestamp: String,
    pub nx: usize,
    pub ny: usize,
    pub grid: Vec<AxisBounds>,
    pub fields: Vec<String>,
}

/// A derived table in memory: two axes plus named row-major value grids
/// (`values[iy * nx + ix]`).
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTable {
    pub key: String,
    pub fingerprint: Fingerprint,
    pub kind: TableKind,
    pub material: String,
    pub grid: Vec<AxisBounds>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub fields: BTreeMap<String, Vec<f64>>,
}

impl CachedTable {
    pub fn field(&self, name: &str) -> Option<&[f64]> {
        self.fields.get(name).map(Vec::as_slice)
    }
}

/// On-disk form of the table values; JSON has no NaN so undefined cells are `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TableData {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub fields: BTreeMap<String, Vec<Option<f64>>>,
}

pub(crate) fn to_nullable(values: &[f64]) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|&v| if v.is_finite() { Some(v) } else { None })
        .collect()
}

pub(crate) fn from_nullable(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}
