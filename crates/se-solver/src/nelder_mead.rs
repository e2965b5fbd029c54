//! Nelder–Mead simplex minimizer.

use crate::error::{SolverError, SolverResult};
use nalgebra::DVector;

/// Nelder–Mead configuration.
///
/// Defaults follow the classic (non-adaptive) coefficients.
#[derive(Clone, Debug)]
pub struct NelderMeadConfig {
    /// Maximum iterations; `None` means `200 * n`
    pub max_iterations: Option<usize>,
    /// Maximum objective evaluations; `None` means `200 * n`
    pub max_evaluations: Option<usize>,
    /// Absolute tolerance on simplex size
    pub x_tol: f64,
    /// Absolute tolerance on objective spread across the simplex
    pub f_tol: f64,
    /// Relative perturbation used to build the initial simplex
    pub initial_step: f64,
    /// Perturbation used for zero-valued coordinates
    pub zero_step: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: None,
            max_evaluations: None,
            x_tol: 1e-4,
            f_tol: 1e-4,
            initial_step: 0.05,
            zero_step: 0.00025,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }
}

/// Minimization result.
#[derive(Clone, Debug)]
pub struct NelderMeadResult {
    /// Best vertex found
    pub x: DVector<f64>,
    /// Objective at `x` (`inf` when every evaluation was NaN)
    pub f: f64,
    pub iterations: usize,
    pub evaluations: usize,
    /// Tolerances met before the iteration/evaluation limits
    pub converged: bool,
}

/// Minimize `objective` starting from `x0`.
///
/// NaN objective values are treated as `+inf`, so the simplex walks away from
/// undefined regions (e.g. outside a table's grid) instead of stalling on them.
pub fn nelder_mead<F>(
    x0: DVector<f64>,
    mut objective: F,
    config: &NelderMeadConfig,
) -> SolverResult<NelderMeadResult>
where
    F: FnMut(&DVector<f64>) -> f64,
{
    let n = x0.len();
    if n == 0 {
        return Err(SolverError::InvalidInput {
            what: "starting point is empty".to_string(),
        });
    }
    if x0.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::InvalidInput {
            what: format!("starting point is not finite: {:?}", x0.as_slice()),
        });
    }
    if !(config.contraction > 0.0 && config.contraction < 1.0)
        || !(config.shrink > 0.0 && config.shrink < 1.0)
        || config.expansion <= 1.0
        || config.reflection <= 0.0
    {
        return Err(SolverError::InvalidConfig {
            what: "coefficients must satisfy 0 < contraction, shrink < 1 < expansion",
        });
    }

    let max_iterations = config.max_iterations.unwrap_or(200 * n);
    let max_evaluations = config.max_evaluations.unwrap_or(200 * n);

    let mut evaluations = 0usize;
    let mut eval = |x: &DVector<f64>, evaluations: &mut usize| -> f64 {
        *evaluations += 1;
        let v = objective(x);
        if v.is_nan() { f64::INFINITY } else { v }
    };

    // Initial simplex
    let mut simplex: Vec<DVector<f64>> = Vec::with_capacity(n + 1);
    simplex.push(x0.clone());
    for k in 0..n {
        let mut y = x0.clone();
        if y[k] != 0.0 {
            y[k] *= 1.0 + config.initial_step;
        } else {
            y[k] = config.zero_step;
        }
        simplex.push(y);
    }
    let mut values: Vec<f64> = simplex.iter().map(|x| eval(x, &mut evaluations)).collect();
    sort_simplex(&mut simplex, &mut values);

    let (rho, chi, psi, sigma) = (
        config.reflection,
        config.expansion,
        config.contraction,
        config.shrink,
    );

    let mut iterations = 0usize;
    let mut converged = false;

    while iterations < max_iterations && evaluations < max_evaluations {
        if within_tolerance(&simplex, &values, config) {
            converged = true;
            break;
        }

        let worst = n;
        let centroid = simplex[..n]
            .iter()
            .fold(DVector::zeros(n), |acc, x| acc + x)
            / n as f64;

        let xr = &centroid * (1.0 + rho) - &simplex[worst] * rho;
        let fxr = eval(&xr, &mut evaluations);
        let mut shrink = false;

        if fxr < values[0] {
            let xe = &centroid * (1.0 + rho * chi) - &simplex[worst] * (rho * chi);
            let fxe = eval(&xe, &mut evaluations);
            if fxe < fxr {
                simplex[worst] = xe;
                values[worst] = fxe;
            } else {
                simplex[worst] = xr;
                values[worst] = fxr;
            }
        } else if fxr < values[n - 1] {
            simplex[worst] = xr;
            values[worst] = fxr;
        } else if fxr < values[worst] {
            // outside contraction
            let xc = &centroid * (1.0 + psi * rho) - &simplex[worst] * (psi * rho);
            let fxc = eval(&xc, &mut evaluations);
            if fxc <= fxr {
                simplex[worst] = xc;
                values[worst] = fxc;
            } else {
                shrink = true;
            }
        } else {
            // inside contraction
            let xcc = &centroid * (1.0 - psi) + &simplex[worst] * psi;
            let fxcc = eval(&xcc, &mut evaluations);
            if fxcc < values[worst] {
                simplex[worst] = xcc;
                values[worst] = fxcc;
            } else {
                shrink = true;
            }
        }

        if shrink {
            let best = simplex[0].clone();
            for j in 1..=n {
                simplex[j] = &best + (&simplex[j] - &best) * sigma;
                values[j] = eval(&simplex[j], &mut evaluations);
            }
        }

        sort_simplex(&mut simplex, &mut values);
        iterations += 1;
    }

    if !converged && within_tolerance(&simplex, &values, config) {
        converged = true;
    }

    Ok(NelderMeadResult {
        x: simplex.swap_remove(0),
        f: values[0],
        iterations,
        evaluations,
        converged,
    })
}

fn sort_simplex(simplex: &mut Vec<DVector<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = order.iter().map(|&i| simplex[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}

fn within_tolerance(simplex: &[DVector<f64>], values: &[f64], config: &NelderMeadConfig) -> bool {
    // an all-undefined simplex is never converged
    if !values[0].is_finite() {
        return false;
    }
    let best = &simplex[0];
    let x_spread = simplex[1..]
        .iter()
        .map(|x| (x - best).amax())
        .fold(0.0_f64, f64::max);
    let f_spread = values[1..]
        .iter()
        .map(|v| (v - values[0]).abs())
        .fold(0.0_f64, f64::max);
    x_spread <= config.x_tol && f_spread <= config.f_tol
}
