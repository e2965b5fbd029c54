//! Radiative cooling helpers built on the query and opacity models.

use crate::context::EosContext;
use crate::phase::Phase;
use crate::query::EosState;
use se_core::constants::STEFAN_BOLTZMANN;
use se_core::units::{Area, Length, Volume};

/// Optical depth of a layer of thickness `dr` [m].
pub fn optical_depth(alpha: f64, dr: f64) -> f64 {
    alpha * dr
}

/// Emissivity of a cell of volume `v` radiating through area `a`, capped at 1.
pub fn emissivity(alpha: f64, v: f64, a: f64) -> f64 {
    (alpha * v / a).min(1.0)
}

/// Radiated power `sigma T^4 A eps` [W].
pub fn luminosity(t: f64, a: f64, emissivity: f64) -> f64 {
    STEFAN_BOLTZMANN * t.powi(4) * a * emissivity
}

/// Time to radiate away `energy` [J] at `luminosity` [W].
pub fn cooling_time(energy: f64, luminosity: f64) -> f64 {
    energy / luminosity
}

/// One cell of a radiating body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiatingCell {
    pub state: EosState,
    /// Radial thickness
    pub thickness: Length,
    pub volume: Volume,
    /// Outward-facing area
    pub area: Area,
}

impl RadiatingCell {
    pub fn mass_kg(&self) -> f64 {
        self.state.density_kg_m3() * self.volume.value
    }
}

/// Result of cooling a cell to its optical-depth threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdCooling {
    pub state: EosState,
    /// Time the cell takes to radiate the energy it lost [s]; 0 when unchanged
    pub cooling_time: f64,
    pub changed: bool,
}

impl EosContext {
    /// Cool the (P, S) state by removing `du` [J/kg] at constant density.
    ///
    /// With `remove_droplets`, a cooled state inside the dome is moved to the
    /// saturated-vapor entropy at its pressure, shedding its condensate.
    pub fn cool_isochoric(&self, p: f64, s: f64, du: f64, remove_droplets: bool) -> EosState {
        let initial = self.state_from_ps(p, s);
        let cooled = self.state_from_rho_u(
            initial.density_kg_m3(),
            initial.internal_energy_j_per_kg - du,
        );
        if !remove_droplets {
            return cooled;
        }

        let p2 = cooled.pressure_pa();
        if self.phase(cooled.entropy_j_per_kg_k, p2) != Phase::Mixture {
            return cooled;
        }
        let s3 = self
            .saturation()
            .condensation_entropy(cooled.entropy_j_per_kg_k, p2);
        tracing::trace!(p = p2, s_from = cooled.entropy_j_per_kg_k, s_to = s3, "removed droplets");
        self.state_from_ps(p2, s3)
    }

    /// Temperature at which vapor of density `rho` in a layer of thickness `dr` [m]
    /// reaches optical depth `tau_threshold`.
    pub fn threshold_cooling_temperature(&self, rho: f64, dr: f64, tau_threshold: f64) -> f64 {
        self.opacity().temperature_for_alpha(rho, tau_threshold / dr)
    }

    /// Cool an optically thick cell at constant density down to the temperature at
    /// which its optical depth falls to `tau_threshold`.
    ///
    /// The cell is left unchanged unless it is above the threshold, loses energy, and
    /// radiates that energy within `max_time` [s]. NaN anywhere leaves it unchanged.
    pub fn threshold_cool(
        &self,
        cell: &RadiatingCell,
        tau_threshold: f64,
        max_time: f64,
    ) -> ThresholdCooling {
        let rho = cell.state.density_kg_m3();
        let t1 = cell.state.temperature_k();
        let dr = cell.thickness.value;
        let (v, a) = (cell.volume.value, cell.area.value);

        let alpha = self.opacity().alpha_v(rho, t1);
        let alpha_threshold = tau_threshold / dr;
        let t2 = self.threshold_cooling_temperature(rho, dr, tau_threshold);

        let du = self.forward().internal_energy(rho, t1) - self.forward().internal_energy(rho, t2);
        let energy = du * cell.mass_kg();
        let power = luminosity(t1, a, emissivity(alpha, v, a));
        let time = cooling_time(energy, power);

        if alpha > alpha_threshold && time < max_time && du > 0.0 {
            ThresholdCooling {
                state: self.state_from_rho_t(rho, t2),
                cooling_time: time,
                changed: true,
            }
        } else {
            ThresholdCooling {
                state: self.state_from_rho_t(rho, t1),
                cooling_time: 0.0,
                changed: false,
            }
        }
    }
}
