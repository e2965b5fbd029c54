//! Radiative absorption coefficients and the inverse vapor-opacity table.

use crate::config::OpacityGridConfig;
use crate::error::{EosError, EosResult};
use crate::phase::{Phase, SaturationModel};
use se_cache::{AxisBounds, CacheError, CachedTable, Fingerprint, TableKind};
use se_core::nan_to_zero;
use se_solver::{RootConfig, find_root};
use se_tables::{Axis, Table2d};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Calibration of the vapor absorption law
/// `alpha_v = b0 r^(1/3) t exp(-b1 / t) exp(-b2 r / t)` with `r = rho / rho_n`,
/// `t = T / t_n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaporAbsorption {
    /// [1/m]
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    /// [kg/m^3]
    pub rho_n: f64,
    /// [K]
    pub t_n: f64,
}

impl Default for VaporAbsorption {
    fn default() -> Self {
        Self {
            b0: 6e17,
            b1: 37.0,
            b2: -11.6,
            rho_n: 1900.0,
            t_n: 4150.0,
        }
    }
}

impl VaporAbsorption {
    pub fn validate(&self) -> EosResult<()> {
        if !(self.b0 > 0.0 && self.rho_n > 0.0 && self.t_n > 0.0)
            || !self.b1.is_finite()
            || !self.b2.is_finite()
        {
            return Err(EosError::Config {
                what: "vapor_absorption needs positive b0, rho_n, t_n and finite b1, b2"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Vapor absorption coefficient [1/m]; NaN results count as non-absorbing (0).
    pub fn alpha_v(&self, rho: f64, t: f64) -> f64 {
        let r = rho / self.rho_n;
        let t = t / self.t_n;
        nan_to_zero(self.b0 * r.cbrt() * t * (-self.b1 / t).exp() * (-self.b2 * r / t).exp())
    }
}

/// Inverse vapor-opacity table: (log10 alpha_v, log10 rho) -> T.
///
/// Cells whose root find fails hold NaN.
#[derive(Debug, Clone)]
pub struct InverseOpacityTable {
    temperature: Table2d,
}

impl InverseOpacityTable {
    /// Root-find every cell serially.
    pub fn build(vapor: &VaporAbsorption, grid: &OpacityGridConfig) -> EosResult<Self> {
        let started = Instant::now();
        let log_alpha = grid.log_alpha_axis()?;
        let log_rho = grid.log_density_axis()?;
        let root_config = RootConfig::default();

        let mut values = Vec::with_capacity(log_alpha.len() * log_rho.len());
        let mut failed = 0usize;
        for &lr in log_rho.values() {
            let rho = 10f64.powf(lr);
            for &la in log_alpha.values() {
                let alpha = 10f64.powf(la);
                let res = find_root(
                    |t| vapor.alpha_v(rho, t) - alpha,
                    grid.initial_temperature,
                    &root_config,
                )?;
                if !res.converged {
                    failed += 1;
                }
                values.push(if res.converged { res.x } else { f64::NAN });
            }
        }

        if failed > 0 {
            tracing::warn!(failed, "inverse opacity cells without a root");
        }
        tracing::info!(
            nx = log_alpha.len(),
            ny = log_rho.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built inverse opacity table"
        );
        Ok(Self {
            temperature: Table2d::new(log_alpha, log_rho, values)?,
        })
    }

    /// Temperature at which the vapor absorption of density `rho` equals `alpha`.
    pub fn temperature(&self, rho: f64, alpha: f64) -> f64 {
        self.temperature.eval(alpha.log10(), rho.log10())
    }

    pub fn table(&self) -> &Table2d {
        &self.temperature
    }

    pub fn to_cached(
        &self,
        key: &str,
        fingerprint: Fingerprint,
        material: &str,
        grid: Vec<AxisBounds>,
    ) -> CachedTable {
        let mut fields = BTreeMap::new();
        fields.insert("temperature".to_string(), self.temperature.values().to_vec());
        CachedTable {
            key: key.to_string(),
            fingerprint,
            kind: TableKind::InverseOpacity,
            material: material.to_string(),
            grid,
            x: self.temperature.x_axis().values().to_vec(),
            y: self.temperature.y_axis().values().to_vec(),
            fields,
        }
    }

    pub fn from_cached(cached: &CachedTable) -> EosResult<Self> {
        let values = cached_field(cached, "temperature")?;
        Ok(Self {
            temperature: Table2d::new(
                Axis::new(cached.x.clone())?,
                Axis::new(cached.y.clone())?,
                values,
            )?,
        })
    }
}

pub(crate) fn cached_field(cached: &CachedTable, name: &'static str) -> EosResult<Vec<f64>> {
    cached
        .field(name)
        .map(<[f64]>::to_vec)
        .ok_or_else(|| {
            EosError::Cache(CacheError::Corrupt {
                key: cached.key.clone(),
                what: format!("missing field {name}"),
            })
        })
}

/// Phase-aware absorption model of one material.
#[derive(Debug, Clone)]
pub struct OpacityModel {
    vapor: VaporAbsorption,
    condensed_alpha: f64,
    inverse: InverseOpacityTable,
}

impl OpacityModel {
    pub fn new(vapor: VaporAbsorption, condensed_alpha: f64, inverse: InverseOpacityTable) -> Self {
        Self {
            vapor,
            condensed_alpha,
            inverse,
        }
    }

    pub fn vapor(&self) -> &VaporAbsorption {
        &self.vapor
    }

    pub fn inverse(&self) -> &InverseOpacityTable {
        &self.inverse
    }

    pub fn alpha_v(&self, rho: f64, t: f64) -> f64 {
        self.vapor.alpha_v(rho, t)
    }

    /// Droplet absorption `6 / (4 d0) * lvf` for droplets of diameter `d0` [m].
    pub fn alpha_l(&self, saturation: &SaturationModel, rho: f64, s: f64, p: f64, d0: f64) -> f64 {
        6.0 / (4.0 * d0) * saturation.liquid_volume_fraction(rho, s, p)
    }

    /// Total absorption coefficient by phase. `d0 = 0` drops the droplet term.
    pub fn alpha_total(
        &self,
        saturation: &SaturationModel,
        rho: f64,
        t: f64,
        p: f64,
        s: f64,
        d0: f64,
    ) -> f64 {
        match saturation.phase(s, p) {
            Phase::Invalid => 0.0,
            Phase::Condensed => self.condensed_alpha,
            Phase::Mixture if d0 != 0.0 => {
                self.alpha_v(rho, t) + nan_to_zero(self.alpha_l(saturation, rho, s, p, d0))
            }
            Phase::Mixture | Phase::Vapor | Phase::Supercritical => self.alpha_v(rho, t),
        }
    }

    /// Temperature at which vapor of density `rho` absorbs `alpha`.
    pub fn temperature_for_alpha(&self, rho: f64, alpha: f64) -> f64 {
        self.inverse.temperature(rho, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dome_material;

    fn small_grid() -> OpacityGridConfig {
        OpacityGridConfig {
            alpha_points: 16,
            density_points: 8,
            ..Default::default()
        }
    }

    fn model() -> (OpacityModel, SaturationModel) {
        let vapor = VaporAbsorption::default();
        let inverse = InverseOpacityTable::build(&vapor, &small_grid()).unwrap();
        let sat = SaturationModel::new(&dome_material(), 1e-5).unwrap();
        (OpacityModel::new(vapor, 1e14, inverse), sat)
    }

    #[test]
    fn alpha_v_reference_point() {
        let v = VaporAbsorption::default();
        // r = t = 1
        let expected = 6e17 * (-37.0f64).exp() * 11.6f64.exp();
        assert!((v.alpha_v(1900.0, 4150.0) - expected).abs() / expected < 1e-12);
        assert_eq!(v.alpha_v(f64::NAN, 3000.0), 0.0);
        assert_eq!(v.alpha_v(1.0, 0.0), 0.0);
    }

    #[test]
    fn alpha_v_increases_with_temperature() {
        let v = VaporAbsorption::default();
        for rho in [1e-4, 1e-2, 1.0, 10.0] {
            let mut last = 0.0;
            for i in 1..=40 {
                let t = 100.0 * i as f64;
                let a = v.alpha_v(rho, t);
                assert!(a >= last, "rho {rho} T {t}");
                last = a;
            }
        }
    }

    #[test]
    fn alpha_total_by_phase() {
        let (m, sat) = model();
        // condensed
        assert_eq!(m.alpha_total(&sat, 3000.0, 2000.0, 1e8, 3000.0, 1e-3), 1e14);
        // invalid
        assert_eq!(m.alpha_total(&sat, 1.0, 2000.0, 1e-6, 3000.0, 1e-3), 0.0);
        // vapor
        assert_eq!(
            m.alpha_total(&sat, 1.0, 3000.0, 1e6, 12000.0, 1e-3),
            m.alpha_v(1.0, 3000.0)
        );
        // mixture with and without droplets
        let (p, s) = (1e6, 5000.0);
        assert_eq!(sat.phase(s, p), Phase::Mixture);
        let with = m.alpha_total(&sat, 10.0, 3000.0, p, s, 1e-3);
        let without = m.alpha_total(&sat, 10.0, 3000.0, p, s, 0.0);
        assert_eq!(without, m.alpha_v(10.0, 3000.0));
        let droplets = 6.0 / (4.0 * 1e-3) * sat.liquid_volume_fraction(10.0, s, p);
        assert!((with - without - droplets).abs() <= 1e-9 * with.abs());
    }

    #[test]
    fn mixture_below_the_triple_point_absorbs_finitely() {
        let (m, sat) = model();
        for (s, p) in [(5000.0, 10.0), (500.0, 1.0)] {
            assert_eq!(sat.phase(s, p), Phase::Mixture);
            let alpha = m.alpha_total(&sat, 1e-3, 3000.0, p, s, 1e-3);
            assert!(alpha.is_finite(), "S {s} P {p}: {alpha}");
            assert!(alpha >= m.alpha_v(1e-3, 3000.0));
        }
    }

    #[test]
    fn inverse_table_round_trips() {
        let (m, _) = model();
        for (rho, t) in [(1e-3, 2500.0), (0.1, 3500.0), (1.0, 5000.0)] {
            let alpha = m.alpha_v(rho, t);
            let t_back = m.temperature_for_alpha(rho, alpha);
            assert!(
                (t_back - t).abs() / t < 0.05,
                "rho {rho}: T {t} -> alpha {alpha:e} -> T {t_back}"
            );
        }
    }

    #[test]
    fn inverse_table_outside_grid_is_nan() {
        let (m, _) = model();
        assert!(m.temperature_for_alpha(1e3, 1.0).is_nan());
        assert!(m.temperature_for_alpha(1.0, 1e20).is_nan());
    }
}
