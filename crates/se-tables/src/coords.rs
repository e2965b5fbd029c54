//! Coordinate pairs for element-wise table lookups.

use crate::error::{TableError, TableResult};

/// Interpolator-ready coordinate pairs: either one scalar pair or two equal-length
/// sequences evaluated element-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatePairs {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl CoordinatePairs {
    /// A single (x, y) pair.
    pub fn scalar(x: f64, y: f64) -> Self {
        Self {
            x: vec![x],
            y: vec![y],
        }
    }

    /// Element-wise pairs from two sequences; lengths must match.
    pub fn from_slices(x: &[f64], y: &[f64]) -> TableResult<Self> {
        if x.len() != y.len() {
            return Err(TableError::ShapeMismatch {
                what: "coordinate pairs",
                left: x.len(),
                right: y.len(),
            });
        }
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    /// Apply `f` to one coordinate, keeping the other (e.g. `log10` of pressure).
    pub fn map_y(mut self, f: impl Fn(f64) -> f64) -> Self {
        self.y.iter_mut().for_each(|v| *v = f(*v));
        self
    }

    pub fn map_x(mut self, f: impl Fn(f64) -> f64) -> Self {
        self.x.iter_mut().for_each(|v| *v = f(*v));
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }
}
