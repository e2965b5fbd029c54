use crate::{CoreError, CoreResult};

pub fn ensure_finite(v: f64, what: &'static str) -> CoreResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive.
pub fn ensure_positive(v: f64, what: &'static str) -> CoreResult<f64> {
    if ensure_finite(v, what)? > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::NonPositive { what, value: v })
    }
}

/// Fractional error `|a - b| / |b|` of `a` against the reference `b`.
///
/// A zero reference gives `inf` (or NaN when `a` is also zero); callers that can
/// legitimately see zero-valued references must handle them before calling.
#[inline]
pub fn frac_error(a: f64, b: f64) -> f64 {
    (a - b).abs() / b.abs()
}

/// Maps NaN to zero, leaving every other value untouched.
#[inline]
pub fn nan_to_zero(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}
