//! Saturation curve and phase classification over (entropy, pressure).
//!
//! The vapor curve is the liquid branch followed by the vapor branch, forming a dome
//! in the (S, P) plane whose apex is the critical point. An anchor at
//! `(0, ANCHOR_PRESSURE)` closes the dome's low-entropy side.

use crate::error::EosResult;
use se_tables::{Linear1d, MaterialTable};
use std::fmt;

/// Anchor pressure of the zero-entropy end of the vapor curve [Pa].
pub const ANCHOR_PRESSURE: f64 = 1e-7;

/// Physical region of an (S, P) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Pressure at or below the validity floor, or NaN input
    Invalid,
    /// Solid or liquid
    Condensed,
    /// Liquid–vapor mixture under the dome
    Mixture,
    Vapor,
    Supercritical,
}

impl Phase {
    /// Stable numeric code for array consumers.
    pub fn code(self) -> u8 {
        match self {
            Self::Invalid => 0,
            Self::Condensed => 1,
            Self::Mixture => 2,
            Self::Vapor => 3,
            Self::Supercritical => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Invalid),
            1 => Some(Self::Condensed),
            2 => Some(Self::Mixture),
            3 => Some(Self::Vapor),
            4 => Some(Self::Supercritical),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalid => "invalid",
            Self::Condensed => "condensed",
            Self::Mixture => "mixture",
            Self::Vapor => "vapor",
            Self::Supercritical => "supercritical",
        };
        f.write_str(name)
    }
}

/// Saturation-curve interpolators and the phase classifier of one material.
#[derive(Debug, Clone)]
pub struct SaturationModel {
    /// P(S) along the whole dome
    vapor_curve: Linear1d,
    /// S_l(P) on the liquid branch
    liquid_entropy: Linear1d,
    /// S_v(P) on the vapor branch
    vapor_entropy: Linear1d,
    /// rho_l(P) on the liquid branch
    liquid_density: Linear1d,
    critical_entropy: f64,
    critical_pressure: f64,
    min_pressure: f64,
}

impl SaturationModel {
    pub fn new(material: &MaterialTable, min_pressure: f64) -> EosResult<Self> {
        let sat = material.saturation();

        let mut dome_s = Vec::with_capacity(1 + sat.liquid_entropy.len() + sat.vapor_entropy.len());
        let mut dome_p = Vec::with_capacity(dome_s.capacity());
        dome_s.push(0.0);
        dome_p.push(ANCHOR_PRESSURE);
        dome_s.extend(sat.liquid_entropy.iter().copied());
        dome_p.extend(sat.liquid_pressure.iter().copied());
        dome_s.extend(sat.vapor_entropy.iter().rev().copied());
        dome_p.extend(sat.vapor_pressure.iter().rev().copied());

        let critical = material.critical();
        Ok(Self {
            vapor_curve: Linear1d::new(&dome_s, &dome_p)?,
            liquid_entropy: Linear1d::new(&sat.liquid_pressure, &sat.liquid_entropy)?,
            vapor_entropy: Linear1d::new(&sat.vapor_pressure, &sat.vapor_entropy)?,
            liquid_density: Linear1d::new(&sat.liquid_pressure, &sat.liquid_density)?,
            critical_entropy: critical.entropy,
            critical_pressure: critical.pressure,
            min_pressure,
        })
    }

    pub fn critical_entropy(&self) -> f64 {
        self.critical_entropy
    }

    pub fn critical_pressure(&self) -> f64 {
        self.critical_pressure
    }

    pub fn min_pressure(&self) -> f64 {
        self.min_pressure
    }

    /// Vapor-curve pressure at entropy `s`.
    ///
    /// Below the curve's entropy range the anchor pressure holds; above it the state
    /// lies on the vapor side of the dome and the curve pressure is zero. NaN in, NaN out.
    pub fn curve_pressure(&self, s: f64) -> f64 {
        if s > self.vapor_curve.x_max() {
            0.0
        } else {
            self.vapor_curve.eval_clamped(s)
        }
    }

    /// Saturated-liquid entropy at pressure `p`.
    ///
    /// Below the triple point the triple-point value holds; above the branch it is NaN.
    pub fn liquid_entropy(&self, p: f64) -> f64 {
        branch_value(&self.liquid_entropy, p)
    }

    /// Saturated-vapor entropy at pressure `p`, held below the triple point.
    pub fn vapor_entropy(&self, p: f64) -> f64 {
        branch_value(&self.vapor_entropy, p)
    }

    /// Saturated-liquid density at pressure `p`, held below the triple point.
    pub fn liquid_density(&self, p: f64) -> f64 {
        branch_value(&self.liquid_density, p)
    }

    pub fn phase(&self, s: f64, p: f64) -> Phase {
        if s.is_nan() || p.is_nan() || p <= self.min_pressure {
            return Phase::Invalid;
        }
        if p < self.curve_pressure(s) {
            Phase::Mixture
        } else if s < self.critical_entropy {
            Phase::Condensed
        } else if p >= self.critical_pressure {
            Phase::Supercritical
        } else {
            Phase::Vapor
        }
    }

    /// Vapor mass fraction by the lever rule.
    ///
    /// 0 when condensed, 1 as vapor, NaN when invalid or supercritical.
    pub fn vapor_quality(&self, s: f64, p: f64) -> f64 {
        match self.phase(s, p) {
            Phase::Condensed => 0.0,
            Phase::Vapor => 1.0,
            Phase::Mixture => {
                let s_l = self.liquid_entropy(p);
                let s_v = self.vapor_entropy(p);
                // the dome extends below the triple point, where the branches are held
                ((s - s_l) / (s_v - s_l)).clamp(0.0, 1.0)
            }
            Phase::Invalid | Phase::Supercritical => f64::NAN,
        }
    }

    /// Liquid volume fraction `(1 - q) rho / rho_l(P)`.
    pub fn liquid_volume_fraction(&self, rho: f64, s: f64, p: f64) -> f64 {
        let q = self.vapor_quality(s, p);
        (1.0 - q) * rho / self.liquid_density(p)
    }

    /// Density of the vapor phase `q / (1/rho - (1 - q)/rho_l(P))`.
    pub fn vapor_density(&self, rho: f64, s: f64, p: f64) -> f64 {
        let q = self.vapor_quality(s, p);
        q / (1.0 / rho - (1.0 - q) / self.liquid_density(p))
    }

    /// Entropy after condensate is removed: the saturated-vapor entropy below the
    /// critical pressure, otherwise unchanged.
    pub fn condensation_entropy(&self, s: f64, p: f64) -> f64 {
        if p.is_nan() {
            f64::NAN
        } else if p < self.critical_pressure {
            self.vapor_entropy(p)
        } else {
            s
        }
    }
}

fn branch_value(branch: &Linear1d, p: f64) -> f64 {
    if p < branch.x_min() {
        branch.eval_clamped(p)
    } else {
        branch.eval(p)
    }
}
