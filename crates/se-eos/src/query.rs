//! Unified EOS query: any supported pair of independent variables in, the full
//! state tuple (rho, T, P, S, u) out.

use crate::context::EosContext;
use crate::error::{EosError, EosResult};
use se_core::units::{Density, Pressure, Temperature, Velocity, k, kg_m3, mps, pa};
use se_core::{SpecEnergy, SpecEntropy, frac_error};
use se_tables::{CoordinatePairs, ForwardEos, TableError};

/// Scalar or sequence input of one query variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Scalar(f64),
    Sequence(Vec<f64>),
}

impl Samples {
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Scalar(v) => std::slice::from_ref(v),
            Self::Sequence(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<f64> for Samples {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<f64>> for Samples {
    fn from(v: Vec<f64>) -> Self {
        Self::Sequence(v)
    }
}

impl From<&[f64]> for Samples {
    fn from(v: &[f64]) -> Self {
        Self::Sequence(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Samples {
    fn from(v: [f64; N]) -> Self {
        Self::Sequence(v.to_vec())
    }
}

/// Independent variable pair a query resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPair {
    /// Density and specific internal energy
    RhoU,
    /// Density and temperature
    RhoT,
    /// Pressure and specific entropy
    PS,
}

/// Query inputs. Set exactly the variables that are known.
///
/// ```no_run
/// # use se_eos::{EosContext, EosQuery};
/// # fn run(ctx: &EosContext) -> se_eos::EosResult<()> {
/// let states = ctx.query(&EosQuery::new().pressure(1e6).entropy(5000.0).check(true))?;
/// println!("rho = {} kg/m^3", states[0].density_kg_m3());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EosQuery {
    pub density: Option<Samples>,
    pub temperature: Option<Samples>,
    pub pressure: Option<Samples>,
    pub entropy: Option<Samples>,
    pub internal_energy: Option<Samples>,
    /// Verify the result through the complementary inverse table
    pub check: bool,
}

impl EosQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn density(mut self, rho: impl Into<Samples>) -> Self {
        self.density = Some(rho.into());
        self
    }

    pub fn temperature(mut self, t: impl Into<Samples>) -> Self {
        self.temperature = Some(t.into());
        self
    }

    pub fn pressure(mut self, p: impl Into<Samples>) -> Self {
        self.pressure = Some(p.into());
        self
    }

    pub fn entropy(mut self, s: impl Into<Samples>) -> Self {
        self.entropy = Some(s.into());
        self
    }

    pub fn internal_energy(mut self, u: impl Into<Samples>) -> Self {
        self.internal_energy = Some(u.into());
        self
    }

    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    fn given(&self) -> Vec<(&'static str, &Samples)> {
        [
            ("rho", &self.density),
            ("T", &self.temperature),
            ("P", &self.pressure),
            ("S", &self.entropy),
            ("u", &self.internal_energy),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.as_ref().map(|v| (name, v)))
        .collect()
    }

    /// Which branch the query dispatches to.
    pub fn pair(&self) -> EosResult<QueryPair> {
        match (
            &self.density,
            &self.temperature,
            &self.pressure,
            &self.entropy,
            &self.internal_energy,
        ) {
            (Some(_), _, _, _, Some(_)) => Ok(QueryPair::RhoU),
            (Some(_), Some(_), _, _, None) => Ok(QueryPair::RhoT),
            (_, _, Some(_), Some(_), _) => Ok(QueryPair::PS),
            _ => Err(self.under_specified()),
        }
    }

    fn under_specified(&self) -> EosError {
        let names: Vec<&str> = self.given().iter().map(|(n, _)| *n).collect();
        EosError::UnderSpecified {
            given: if names.is_empty() {
                "nothing".to_string()
            } else {
                names.join(", ")
            },
        }
    }

    /// Element-wise coordinates of the dispatched branch: (rho, u), (rho, T) or (P, S).
    pub fn coordinates(&self, pair: QueryPair) -> EosResult<CoordinatePairs> {
        let (x, (y_name, y)) = match pair {
            QueryPair::RhoU => (&self.density, ("u", &self.internal_energy)),
            QueryPair::RhoT => (&self.density, ("T", &self.temperature)),
            QueryPair::PS => (&self.pressure, ("S", &self.entropy)),
        };
        let (Some(x), Some(y)) = (x, y) else {
            return Err(self.under_specified());
        };
        CoordinatePairs::from_slices(x.as_slice(), y.as_slice()).map_err(|e| match e {
            TableError::ShapeMismatch { left, right, .. } => EosError::LengthMismatch {
                what: y_name,
                expected: left,
                found: right,
            },
            other => other.into(),
        })
    }

    /// Common length of every provided input.
    fn len(&self) -> EosResult<usize> {
        let given = self.given();
        let Some((_, first)) = given.first() else {
            return Ok(0);
        };
        let expected = first.len();
        for (what, samples) in &given {
            if samples.len() != expected {
                return Err(EosError::LengthMismatch {
                    what,
                    expected,
                    found: samples.len(),
                });
            }
        }
        Ok(expected)
    }
}

/// Full thermodynamic state at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EosState {
    pub density: Density,
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub entropy_j_per_kg_k: SpecEntropy,
    pub internal_energy_j_per_kg: SpecEnergy,
}

impl EosState {
    pub fn new(rho: f64, t: f64, p: f64, s: f64, u: f64) -> Self {
        Self {
            density: kg_m3(rho),
            temperature: k(t),
            pressure: pa(p),
            entropy_j_per_kg_k: s,
            internal_energy_j_per_kg: u,
        }
    }

    pub fn density_kg_m3(&self) -> f64 {
        self.density.value
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature.value
    }

    pub fn pressure_pa(&self) -> f64 {
        self.pressure.value
    }
}

impl EosContext {
    /// State from density and temperature via the forward tables.
    pub fn state_from_rho_t(&self, rho: f64, t: f64) -> EosState {
        let f = self.forward().lookup(rho, t);
        EosState::new(rho, t, f.pressure, f.entropy, f.internal_energy)
    }

    /// State from density and specific internal energy via the (u, rho) inverse.
    pub fn state_from_rho_u(&self, rho: f64, u: f64) -> EosState {
        let t = self.inverse_u_rho().temperature(u, rho);
        let f = self.forward().lookup(rho, t);
        EosState::new(rho, t, f.pressure, f.entropy, u)
    }

    /// State from pressure and specific entropy via the (S, P) inverse.
    pub fn state_from_ps(&self, p: f64, s: f64) -> EosState {
        let (rho, t) = self.inverse_sp().lookup(s, p);
        let u = self.forward().internal_energy(rho, t);
        EosState::new(rho, t, p, s, u)
    }

    /// Sound speed at (rho, T) from the forward tables.
    pub fn sound_speed(&self, rho: f64, t: f64) -> Velocity {
        mps(self.forward().sound_speed(rho, t))
    }

    /// Resolve a query element-wise. Fails on an unsupported variable combination,
    /// on inputs of different lengths, and (with `check`) on a round-trip error at or
    /// above the configured tolerance.
    pub fn query(&self, query: &EosQuery) -> EosResult<Vec<EosState>> {
        let pair = query.pair()?;
        let coords = query.coordinates(pair)?;
        // redundant inputs (T next to rho and u) must agree in length too
        query.len()?;

        let states: Vec<EosState> = coords
            .iter()
            .map(|(x, y)| match pair {
                QueryPair::RhoU => self.state_from_rho_u(x, y),
                QueryPair::RhoT => self.state_from_rho_t(x, y),
                QueryPair::PS => self.state_from_ps(x, y),
            })
            .collect();

        if query.check {
            self.check_states(pair, &states)?;
        }
        Ok(states)
    }

    /// Single-point query.
    pub fn query_one(&self, query: &EosQuery) -> EosResult<EosState> {
        let states = self.query(query)?;
        match states.as_slice() {
            [state] => Ok(*state),
            _ => Err(EosError::LengthMismatch {
                what: "single-point query",
                expected: 1,
                found: states.len(),
            }),
        }
    }

    /// Recompute each state through the complementary inverse table. NaN errors
    /// (states at a table boundary) are not violations.
    fn check_states(&self, pair: QueryPair, states: &[EosState]) -> EosResult<()> {
        let tolerance = self.config().check_tolerance;
        let violation = |variable: &'static str, index: usize, error: f64| -> EosResult<()> {
            if error >= tolerance {
                tracing::warn!(variable, index, error, "query consistency check failed");
                return Err(EosError::ConsistencyCheck {
                    variable,
                    index,
                    error,
                    tolerance,
                });
            }
            Ok(())
        };

        for (i, state) in states.iter().enumerate() {
            let rho = state.density_kg_m3();
            let t = state.temperature_k();
            match pair {
                QueryPair::RhoU | QueryPair::RhoT => {
                    let (rho_check, t_check) = self
                        .inverse_sp()
                        .lookup(state.entropy_j_per_kg_k, state.pressure_pa());
                    violation("density", i, frac_error(rho_check, rho))?;
                    violation("temperature", i, frac_error(t_check, t))?;
                }
                QueryPair::PS => {
                    let t_check = self
                        .inverse_u_rho()
                        .temperature(state.internal_energy_j_per_kg, rho);
                    violation("temperature", i, frac_error(t_check, t))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_given_variables() {
        let q = EosQuery::new().density(1.0).internal_energy(1e6);
        assert_eq!(q.pair().unwrap(), QueryPair::RhoU);

        let q = EosQuery::new().density(1.0).temperature(300.0);
        assert_eq!(q.pair().unwrap(), QueryPair::RhoT);

        let q = EosQuery::new().pressure(1e5).entropy(5000.0);
        assert_eq!(q.pair().unwrap(), QueryPair::PS);

        // rho and u take precedence over a redundant T
        let q = EosQuery::new()
            .density(1.0)
            .temperature(300.0)
            .internal_energy(1e6);
        assert_eq!(q.pair().unwrap(), QueryPair::RhoU);
    }

    #[test]
    fn unsupported_combinations_fail() {
        for q in [
            EosQuery::new(),
            EosQuery::new().temperature(300.0).pressure(1e5),
            EosQuery::new().density(1.0).pressure(1e5),
            EosQuery::new().entropy(5000.0).internal_energy(1e6),
        ] {
            assert!(matches!(q.pair(), Err(EosError::UnderSpecified { .. })));
        }
        let err = EosQuery::new().temperature(300.0).pair().unwrap_err();
        assert!(err.to_string().contains("given T"));
    }

    #[test]
    fn lengths_must_agree() {
        let q = EosQuery::new().density(vec![1.0, 2.0]).temperature(300.0);
        assert!(matches!(
            q.len(),
            Err(EosError::LengthMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
        let q = EosQuery::new().density([1.0, 2.0]).temperature([300.0, 400.0]);
        assert_eq!(q.len().unwrap(), 2);
    }

    #[test]
    fn branch_coordinates_pair_up_element_wise() {
        let q = EosQuery::new().pressure([1e5, 1e6]).entropy(5000.0);
        let err = q.coordinates(QueryPair::PS).unwrap_err();
        assert!(matches!(
            err,
            EosError::LengthMismatch {
                what: "S",
                expected: 2,
                found: 1,
            }
        ));

        let q = EosQuery::new().density(1.0).internal_energy(2e6).temperature(300.0);
        let coords = q.coordinates(q.pair().unwrap()).unwrap();
        assert_eq!(coords.iter().collect::<Vec<_>>(), vec![(1.0, 2e6)]);

        let q = EosQuery::new().pressure([1e5, 1e6]).entropy([4000.0, 6000.0]);
        let coords = q.coordinates(QueryPair::PS).unwrap();
        assert_eq!(coords.x(), &[1e5, 1e6]);
        assert_eq!(coords.y(), &[4000.0, 6000.0]);

        let q = EosQuery::new().density(1.0);
        assert!(matches!(
            q.coordinates(QueryPair::RhoT),
            Err(EosError::UnderSpecified { .. })
        ));
    }

    #[test]
    fn state_getters() {
        let s = EosState::new(3000.0, 2000.0, 1e9, 4000.0, 2e6);
        assert_eq!(s.density_kg_m3(), 3000.0);
        assert_eq!(s.temperature_k(), 2000.0);
        assert_eq!(s.pressure_pa(), 1e9);
    }
}
