//! Grid interpolators.
//!
//! Both interpolators are immutable after construction and return NaN outside their
//! domain (no extrapolation).

use crate::axis::Axis;
use crate::coords::CoordinatePairs;
use crate::error::{TableError, TableResult};

/// Values on a regular rectilinear grid, bilinearly interpolated.
///
/// `values` is row-major with rows along `y`: `values[iy * nx + ix]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table2d {
    x: Axis,
    y: Axis,
    values: Vec<f64>,
}

impl Table2d {
    pub fn new(x: Axis, y: Axis, values: Vec<f64>) -> TableResult<Self> {
        let expected = x.len() * y.len();
        if values.len() != expected {
            return Err(TableError::ShapeMismatch {
                what: "grid values",
                left: values.len(),
                right: expected,
            });
        }
        Ok(Self { x, y, values })
    }

    pub fn x_axis(&self) -> &Axis {
        &self.x
    }

    pub fn y_axis(&self) -> &Axis {
        &self.y
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// (rows, columns) = (ny, nx)
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    /// Stored value at row `iy`, column `ix`.
    pub fn at(&self, iy: usize, ix: usize) -> f64 {
        self.values[iy * self.x.len() + ix]
    }

    pub fn row(&self, iy: usize) -> &[f64] {
        let nx = self.x.len();
        &self.values[iy * nx..(iy + 1) * nx]
    }

    /// Bilinear interpolation at (x, y); NaN outside the grid.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let (Some((ix, fx)), Some((iy, fy))) = (self.x.locate(x), self.y.locate(y)) else {
            return f64::NAN;
        };

        let corners = [
            (iy, ix, (1.0 - fx) * (1.0 - fy)),
            (iy, ix + 1, fx * (1.0 - fy)),
            (iy + 1, ix, (1.0 - fx) * fy),
            (iy + 1, ix + 1, fx * fy),
        ];

        // zero-weight corners are skipped so exact grid hits ignore NaN neighbours
        corners
            .iter()
            .filter(|(_, _, w)| *w > 0.0)
            .map(|&(r, c, w)| w * self.at(r, c))
            .sum()
    }

    pub fn eval_pairs(&self, pairs: &CoordinatePairs) -> Vec<f64> {
        pairs.iter().map(|(x, y)| self.eval(x, y)).collect()
    }
}

/// Piecewise-linear 1-D interpolator over sorted abscissae.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear1d {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Linear1d {
    /// Build from unsorted samples. Pairs containing NaN are dropped; the rest are
    /// sorted by `x`.
    pub fn new(x: &[f64], y: &[f64]) -> TableResult<Self> {
        if x.len() != y.len() {
            return Err(TableError::ShapeMismatch {
                what: "1-D interpolator samples",
                left: x.len(),
                right: y.len(),
            });
        }
        let mut pairs: Vec<(f64, f64)> = x
            .iter()
            .copied()
            .zip(y.iter().copied())
            .filter(|(a, b)| !a.is_nan() && !b.is_nan())
            .collect();
        if pairs.len() < 2 {
            return Err(TableError::InvalidTable {
                what: format!("1-D interpolator needs at least 2 samples, got {}", pairs.len()),
            });
        }
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = pairs.into_iter().unzip();
        Ok(Self { x, y })
    }

    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Interpolated value; NaN outside `[x_min, x_max]` or for NaN input.
    pub fn eval(&self, x: f64) -> f64 {
        if !(x >= self.x_min() && x <= self.x_max()) {
            return f64::NAN;
        }
        let n = self.x.len();
        let upper = self.x.partition_point(|&v| v <= x);
        let i = upper.saturating_sub(1).min(n - 2);
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        if x1 == x0 {
            return self.y[i];
        }
        let f = (x - x0) / (x1 - x0);
        self.y[i] + f * (self.y[i + 1] - self.y[i])
    }

    /// Like [`Linear1d::eval`], but holds the end values outside the sampled range.
    /// NaN input still yields NaN.
    pub fn eval_clamped(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x < self.x_min() {
            return self.y[0];
        }
        if x > self.x_max() {
            return self.y[self.y.len() - 1];
        }
        self.eval(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane() -> Table2d {
        // v = 2x + 3y on x in {0,1,2}, y in {0,10}
        let x = Axis::new(vec![0.0, 1.0, 2.0]).unwrap();
        let y = Axis::new(vec![0.0, 10.0]).unwrap();
        let values = vec![0.0, 2.0, 4.0, 30.0, 32.0, 34.0];
        Table2d::new(x, y, values).unwrap()
    }

    #[test]
    fn bilinear_reproduces_plane() {
        let t = plane();
        for &(x, y) in &[(0.0, 0.0), (0.5, 5.0), (1.7, 2.5), (2.0, 10.0)] {
            let v = t.eval(x, y);
            assert!((v - (2.0 * x + 3.0 * y)).abs() < 1e-12, "v({x},{y}) = {v}");
        }
    }

    #[test]
    fn outside_grid_is_nan() {
        let t = plane();
        assert!(t.eval(-0.1, 5.0).is_nan());
        assert!(t.eval(1.0, 10.1).is_nan());
        assert!(t.eval(f64::NAN, 5.0).is_nan());
        assert!(t.eval(1.0, f64::NAN).is_nan());
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let x = Axis::new(vec![0.0, 1.0]).unwrap();
        let y = Axis::new(vec![0.0, 1.0]).unwrap();
        assert!(Table2d::new(x, y, vec![1.0; 3]).is_err());
    }

    #[test]
    fn exact_node_ignores_nan_neighbour() {
        let x = Axis::new(vec![0.0, 1.0]).unwrap();
        let y = Axis::new(vec![0.0, 1.0]).unwrap();
        let t = Table2d::new(x, y, vec![5.0, f64::NAN, 7.0, 8.0]).unwrap();
        assert_eq!(t.eval(0.0, 0.0), 5.0);
        assert!(t.eval(0.5, 0.0).is_nan());
    }

    #[test]
    fn linear1d_sorts_and_interpolates() {
        let f = Linear1d::new(&[2.0, 0.0, 1.0], &[20.0, 0.0, 10.0]).unwrap();
        assert_eq!(f.eval(0.5), 5.0);
        assert_eq!(f.eval(2.0), 20.0);
        assert!(f.eval(2.5).is_nan());
        assert!(f.eval(f64::NAN).is_nan());
        assert_eq!(f.eval_clamped(2.5), 20.0);
        assert_eq!(f.eval_clamped(-1.0), 0.0);
    }

    #[test]
    fn linear1d_drops_nan_samples() {
        let f = Linear1d::new(&[0.0, f64::NAN, 1.0], &[0.0, 3.0, 1.0]).unwrap();
        assert_eq!(f.eval(0.25), 0.25);
        assert!(Linear1d::new(&[0.0], &[1.0]).is_err());
    }
}
