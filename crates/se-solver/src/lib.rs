//! Numerical solvers used to invert tabulated equations of state.
//!
//! Both solvers are derivative-free and report non-convergence in their result
//! instead of failing: table builders store the degraded value and its residual.

pub mod error;
pub mod nelder_mead;
pub mod root;

pub use error::{SolverError, SolverResult};
pub use nelder_mead::{NelderMeadConfig, NelderMeadResult, nelder_mead};
pub use root::{RootConfig, RootResult, find_root};
