//! Bracketed scalar root finder for positive unknowns.
//!
//! Starting from a positive guess the bracket `[g / k, g * k]` is widened
//! geometrically until the function changes sign, then bisected. Works for
//! temperature-like unknowns that span many decades.

use crate::error::{SolverError, SolverResult};

/// Root finder configuration.
#[derive(Clone, Debug)]
pub struct RootConfig {
    /// Geometric widening factor of the bracket per step
    pub bracket_factor: f64,
    /// Maximum bracket widening steps
    pub max_bracket_steps: usize,
    /// Relative tolerance on the bracket width
    pub x_tol_rel: f64,
    /// Maximum bisection iterations
    pub max_iterations: usize,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            bracket_factor: 1.6,
            max_bracket_steps: 60,
            x_tol_rel: 1e-10,
            max_iterations: 200,
        }
    }
}

/// Root finding result.
#[derive(Clone, Debug)]
pub struct RootResult {
    /// Root estimate; NaN when no sign change was found
    pub x: f64,
    pub converged: bool,
    pub iterations: usize,
}

impl RootResult {
    fn failed(iterations: usize) -> Self {
        Self {
            x: f64::NAN,
            converged: false,
            iterations,
        }
    }
}

/// Find `x > 0` with `f(x) = 0` near `guess`.
///
/// Failure to bracket is not an error: the result has `converged = false` and a NaN
/// root, so table builders can store the cell as undefined.
pub fn find_root<F>(mut f: F, guess: f64, config: &RootConfig) -> SolverResult<RootResult>
where
    F: FnMut(f64) -> f64,
{
    if !(guess.is_finite() && guess > 0.0) {
        return Err(SolverError::InvalidInput {
            what: format!("root guess must be positive and finite, got {guess}"),
        });
    }
    if config.bracket_factor <= 1.0 {
        return Err(SolverError::InvalidConfig {
            what: "bracket_factor must be greater than 1",
        });
    }

    let f_guess = f(guess);
    if f_guess == 0.0 {
        return Ok(RootResult {
            x: guess,
            converged: true,
            iterations: 0,
        });
    }

    // Widen until a sign change appears on either side of the guess
    let mut lo = guess;
    let mut hi = guess;
    let mut f_lo = f_guess;
    let mut f_hi = f_guess;
    let mut bracket = None;
    for _ in 0..config.max_bracket_steps {
        let next_lo = lo / config.bracket_factor;
        let f_next_lo = f(next_lo);
        if f_next_lo.is_finite() && f_lo.is_finite() && f_next_lo * f_lo <= 0.0 {
            bracket = Some((next_lo, lo, f_next_lo));
            break;
        }
        lo = next_lo;
        f_lo = f_next_lo;

        let next_hi = hi * config.bracket_factor;
        let f_next_hi = f(next_hi);
        if f_next_hi.is_finite() && f_hi.is_finite() && f_hi * f_next_hi <= 0.0 {
            bracket = Some((hi, next_hi, f_hi));
            break;
        }
        hi = next_hi;
        f_hi = f_next_hi;
    }

    let Some((mut a, mut b, mut f_a)) = bracket else {
        return Ok(RootResult::failed(0));
    };
    if f_a == 0.0 {
        return Ok(RootResult {
            x: a,
            converged: true,
            iterations: 0,
        });
    }

    for iter in 1..=config.max_iterations {
        let mid = 0.5 * (a + b);
        let f_mid = f(mid);
        if !f_mid.is_finite() {
            return Ok(RootResult::failed(iter));
        }
        if f_mid == 0.0 || (b - a) <= config.x_tol_rel * mid.abs() {
            return Ok(RootResult {
                x: mid,
                converged: true,
                iterations: iter,
            });
        }
        if f_a * f_mid < 0.0 {
            b = mid;
        } else {
            a = mid;
            f_a = f_mid;
        }
    }

    Ok(RootResult {
        x: 0.5 * (a + b),
        converged: false,
        iterations: config.max_iterations,
    })
}
