//! Grid axes for tabulated and derived tables.
//!
//! An [`Axis`] is a validated, strictly increasing sequence of coordinates. Derived
//! tables describe their axes with [`AxisSpec`] (bounds + point count + spacing), which
//! generates the coordinates and carries the grid parameters into cache fingerprints.

use crate::error::{TableError, TableResult};
use std::fmt;

/// Type of axis progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSpacing {
    /// Uniformly spaced points
    Linear,
    /// Logarithmically spaced points
    Logarithmic,
}

/// Definition of a generated axis.
///
/// `start`/`end` are the coordinate values themselves (for logarithmic spacing both
/// must be positive; the points are uniform in `log10`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpec {
    pub start: f64,
    pub end: f64,
    pub points: usize,
    pub spacing: GridSpacing,
}

impl AxisSpec {
    pub fn linear(start: f64, end: f64, points: usize) -> Self {
        Self {
            start,
            end,
            points,
            spacing: GridSpacing::Linear,
        }
    }

    /// Logarithmic spacing between `10^log_start` and `10^log_end`.
    pub fn log10(log_start: f64, log_end: f64, points: usize) -> Self {
        Self {
            start: 10f64.powf(log_start),
            end: 10f64.powf(log_end),
            points,
            spacing: GridSpacing::Logarithmic,
        }
    }

    /// Generate all points.
    pub fn generate_points(&self) -> Vec<f64> {
        match self.spacing {
            GridSpacing::Linear => linspace(self.start, self.end, self.points),
            GridSpacing::Logarithmic => {
                if self.start <= 0.0 || self.end <= 0.0 {
                    return linspace(self.start, self.end, self.points);
                }
                linspace(self.start.log10(), self.end.log10(), self.points)
                    .into_iter()
                    .map(|e| 10f64.powf(e))
                    .collect()
            }
        }
    }

    /// Generate and validate the axis.
    pub fn build(&self) -> TableResult<Axis> {
        if self.points < 2 {
            return Err(TableError::InvalidArg {
                what: "axis must have at least 2 points",
            });
        }
        Axis::new(self.generate_points())
    }

    /// Concatenate several segments into one axis (e.g. a linear low-energy segment
    /// followed by a logarithmic high-energy segment).
    pub fn concat(segments: &[AxisSpec]) -> TableResult<Axis> {
        let mut values = Vec::with_capacity(segments.iter().map(|s| s.points).sum());
        for seg in segments {
            values.extend(seg.generate_points());
        }
        Axis::new(values)
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![start];
    }
    let delta = (end - start) / (n - 1) as f64;
    let mut points: Vec<f64> = (0..n).map(|i| start + i as f64 * delta).collect();
    // Ensure exact endpoint
    points[n - 1] = end;
    points
}

/// A strictly increasing coordinate axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    values: Vec<f64>,
}

impl Axis {
    pub fn new(values: Vec<f64>) -> TableResult<Self> {
        if values.len() < 2 {
            return Err(TableError::InvalidTable {
                what: format!("axis needs at least 2 points, got {}", values.len()),
            });
        }
        if let Some(i) = values
            .windows(2)
            .position(|w| !(w[0].is_finite() && w[1].is_finite() && w[1] > w[0]))
        {
            return Err(TableError::InvalidTable {
                what: format!(
                    "axis not strictly increasing at index {}: {} -> {}",
                    i,
                    values[i],
                    values[i + 1]
                ),
            });
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.values[0]
    }

    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.first() && x <= self.last()
    }

    /// Locate the cell holding `x`: returns the lower index `i` and the fractional
    /// position in `[x_i, x_{i+1}]`. `None` outside the axis or for NaN.
    pub fn locate(&self, x: f64) -> Option<(usize, f64)> {
        if !self.contains(x) {
            return None;
        }
        let n = self.values.len();
        // first index with value > x, minus one
        let upper = self.values.partition_point(|&v| v <= x);
        let i = upper.saturating_sub(1).min(n - 2);
        let x0 = self.values[i];
        let x1 = self.values[i + 1];
        Some((i, (x - x0) / (x1 - x0)))
    }
}

impl fmt::Display for GridSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::Logarithmic => write!(f, "Logarithmic"),
        }
    }
}

impl fmt::Display for AxisSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} axis from {:e} to {:e} ({} points)",
            self.spacing, self.start, self.end, self.points
        )
    }
}
