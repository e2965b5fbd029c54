//! Direct (u, ρ) → T inversion primitive.

use se_core::MaterialId;

/// Black-box inversion `T(u, ρ, material)` used to fill the (u, log ρ) → T table.
///
/// This is typically an external EOS library call and the most expensive per-cell
/// operation of a table build, so it must be callable from every worker thread.
/// Non-convergent evaluations should return NaN rather than a sentinel.
pub trait DirectInversion: Send + Sync {
    fn temperature(&self, u: f64, rho: f64, material: MaterialId) -> f64;

    /// Identifies the primitive in cache fingerprints. Tables built by primitives
    /// with different labels never share a cache entry.
    fn label(&self) -> &str {
        "external"
    }
}

impl<F> DirectInversion for F
where
    F: Fn(f64, f64, MaterialId) -> f64 + Send + Sync,
{
    fn temperature(&self, u: f64, rho: f64, material: MaterialId) -> f64 {
        self(u, rho, material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_inversions() {
        let linear = |u: f64, _rho: f64, _m: MaterialId| u / 1000.0;
        let id = MaterialId::new(400).unwrap();
        assert_eq!(linear.temperature(2.0e6, 1.0, id), 2000.0);

        let boxed: Box<dyn DirectInversion> = Box::new(linear);
        assert_eq!(boxed.temperature(1.0e3, 1.0, id), 1.0);
        assert_eq!(boxed.label(), "external");
    }
}
