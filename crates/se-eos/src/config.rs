//! Engine configuration: derived-table grids, worker pool and model constants.
//!
//! Every field has a default, so a configuration file only needs to name what it
//! overrides.
//!
//! ```yaml
//! workers: 4
//! sp_grid:
//!   entropy_points: 100
//!   pressure_points: 100
//! droplet_diameter: 0.0005
//! ```

use crate::error::{EosError, EosResult};
use crate::opacity::VaporAbsorption;
use se_cache::AxisBounds;
use se_tables::{Axis, AxisSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// (S, log10 P) grid of the entropy–pressure inverse table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpGridConfig {
    pub entropy_min: f64,
    pub entropy_max: f64,
    pub entropy_points: usize,
    pub log_pressure_min: f64,
    pub log_pressure_max: f64,
    pub pressure_points: usize,
}

impl Default for SpGridConfig {
    fn default() -> Self {
        Self {
            entropy_min: 1000.0,
            entropy_max: 20000.0,
            entropy_points: 200,
            log_pressure_min: -4.0,
            log_pressure_max: 13.0,
            pressure_points: 200,
        }
    }
}

impl SpGridConfig {
    pub fn entropy_axis(&self) -> EosResult<Axis> {
        Ok(AxisSpec::linear(self.entropy_min, self.entropy_max, self.entropy_points).build()?)
    }

    pub fn log_pressure_axis(&self) -> EosResult<Axis> {
        Ok(AxisSpec::linear(
            self.log_pressure_min,
            self.log_pressure_max,
            self.pressure_points,
        )
        .build()?)
    }

    pub fn bounds(&self) -> Vec<AxisBounds> {
        vec![
            AxisBounds::new(self.entropy_min, self.entropy_max, self.entropy_points),
            AxisBounds::new(
                self.log_pressure_min,
                self.log_pressure_max,
                self.pressure_points,
            ),
        ]
    }
}

/// (u, log10 rho) grid of the energy–density inverse table.
///
/// The energy axis is a linear segment `[0, linear_energy_max]` with `points / 2`
/// points followed by a logarithmic segment `[10^log_energy_min, 10^log_energy_max]`
/// with the remaining points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct URhoGridConfig {
    pub energy_points: usize,
    pub linear_energy_max: f64,
    pub log_energy_min: f64,
    pub log_energy_max: f64,
    pub log_density_min: f64,
    pub log_density_max: f64,
    pub density_points: usize,
}

impl Default for URhoGridConfig {
    fn default() -> Self {
        Self {
            energy_points: 200,
            linear_energy_max: 1e5,
            log_energy_min: 5.1,
            log_energy_max: 8.0,
            log_density_min: -8.0,
            log_density_max: 5.0,
            density_points: 200,
        }
    }
}

impl URhoGridConfig {
    fn segments(&self) -> [AxisSpec; 2] {
        let linear = self.energy_points / 2;
        [
            AxisSpec::linear(0.0, self.linear_energy_max, linear),
            AxisSpec::log10(
                self.log_energy_min,
                self.log_energy_max,
                self.energy_points - linear,
            ),
        ]
    }

    pub fn energy_axis(&self) -> EosResult<Axis> {
        Ok(AxisSpec::concat(&self.segments())?)
    }

    pub fn log_density_axis(&self) -> EosResult<Axis> {
        Ok(AxisSpec::linear(
            self.log_density_min,
            self.log_density_max,
            self.density_points,
        )
        .build()?)
    }

    pub fn bounds(&self) -> Vec<AxisBounds> {
        let [linear, log] = self.segments();
        vec![
            AxisBounds::new(linear.start, linear.end, linear.points),
            AxisBounds::new(self.log_energy_min, self.log_energy_max, log.points),
            AxisBounds::new(
                self.log_density_min,
                self.log_density_max,
                self.density_points,
            ),
        ]
    }
}

/// (log10 alpha_v, log10 rho) grid of the inverse opacity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacityGridConfig {
    pub log_alpha_min: f64,
    pub log_alpha_max: f64,
    pub alpha_points: usize,
    pub log_density_min: f64,
    pub log_density_max: f64,
    pub density_points: usize,
    /// Starting temperature of each root find [K]
    pub initial_temperature: f64,
}

impl Default for OpacityGridConfig {
    fn default() -> Self {
        Self {
            log_alpha_min: -20.0,
            log_alpha_max: 10.0,
            alpha_points: 50,
            log_density_min: -5.0,
            log_density_max: 1.0,
            density_points: 50,
            initial_temperature: 3000.0,
        }
    }
}

impl OpacityGridConfig {
    pub fn log_alpha_axis(&self) -> EosResult<Axis> {
        Ok(AxisSpec::linear(self.log_alpha_min, self.log_alpha_max, self.alpha_points).build()?)
    }

    pub fn log_density_axis(&self) -> EosResult<Axis> {
        Ok(AxisSpec::linear(
            self.log_density_min,
            self.log_density_max,
            self.density_points,
        )
        .build()?)
    }

    pub fn bounds(&self) -> Vec<AxisBounds> {
        vec![
            AxisBounds::new(self.log_alpha_min, self.log_alpha_max, self.alpha_points),
            AxisBounds::new(
                self.log_density_min,
                self.log_density_max,
                self.density_points,
            ),
        ]
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EosConfig {
    pub sp_grid: SpGridConfig,
    pub u_rho_grid: URhoGridConfig,
    pub opacity_grid: OpacityGridConfig,
    /// Width of the table-building worker pool
    pub workers: usize,
    /// Inverse-table cells with a residual above this are flagged in the build log
    pub residual_threshold: f64,
    /// Fractional tolerance of the query round-trip check
    pub check_tolerance: f64,
    /// Pressures at or below this are outside the valid region [Pa]
    pub min_pressure: f64,
    /// Absorption coefficient assigned to condensed material [1/m]
    pub condensed_absorption: f64,
    /// Default liquid droplet diameter D0 [m]
    pub droplet_diameter: f64,
    pub vapor_absorption: VaporAbsorption,
}

impl Default for EosConfig {
    fn default() -> Self {
        Self {
            sp_grid: SpGridConfig::default(),
            u_rho_grid: URhoGridConfig::default(),
            opacity_grid: OpacityGridConfig::default(),
            workers: 7,
            residual_threshold: 0.1,
            check_tolerance: 0.1,
            min_pressure: 1e-5,
            condensed_absorption: 1e14,
            droplet_diameter: 1e-3,
            vapor_absorption: VaporAbsorption::default(),
        }
    }
}

fn config_error(what: impl Into<String>) -> EosError {
    EosError::Config { what: what.into() }
}

impl EosConfig {
    pub fn validate(&self) -> EosResult<()> {
        if self.workers == 0 {
            return Err(config_error("workers must be at least 1"));
        }
        if self.sp_grid.entropy_points < 2 || self.sp_grid.pressure_points < 2 {
            return Err(config_error("sp_grid needs at least 2 points per axis"));
        }
        if !(self.sp_grid.entropy_max > self.sp_grid.entropy_min)
            || !(self.sp_grid.log_pressure_max > self.sp_grid.log_pressure_min)
        {
            return Err(config_error("sp_grid bounds must be increasing"));
        }
        let u = &self.u_rho_grid;
        if u.energy_points < 4 || u.density_points < 2 {
            return Err(config_error(
                "u_rho_grid needs at least 4 energy and 2 density points",
            ));
        }
        if !(u.linear_energy_max > 0.0)
            || !(u.log_energy_max > u.log_energy_min)
            || 10f64.powf(u.log_energy_min) <= u.linear_energy_max
            || !(u.log_density_max > u.log_density_min)
        {
            return Err(config_error(
                "u_rho_grid segments must be increasing and non-overlapping",
            ));
        }
        let o = &self.opacity_grid;
        if o.alpha_points < 2 || o.density_points < 2 {
            return Err(config_error("opacity_grid needs at least 2 points per axis"));
        }
        if !(o.log_alpha_max > o.log_alpha_min) || !(o.log_density_max > o.log_density_min) {
            return Err(config_error("opacity_grid bounds must be increasing"));
        }
        if !(o.initial_temperature > 0.0) {
            return Err(config_error("opacity_grid.initial_temperature must be positive"));
        }
        for (what, v) in [
            ("residual_threshold", self.residual_threshold),
            ("check_tolerance", self.check_tolerance),
            ("min_pressure", self.min_pressure),
            ("condensed_absorption", self.condensed_absorption),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(config_error(format!("{what} must be positive, got {v}")));
            }
        }
        if !(self.droplet_diameter.is_finite() && self.droplet_diameter >= 0.0) {
            return Err(config_error("droplet_diameter must be non-negative"));
        }
        self.vapor_absorption.validate()
    }

    pub fn from_yaml_str(content: &str) -> EosResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> EosResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> EosResult<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    pub fn load_json(path: &Path) -> EosResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn save_yaml(&self, path: &Path) -> EosResult<()> {
        self.validate()?;
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EosConfig::default();
        config.validate().unwrap();
        assert_eq!(config.workers, 7);
        assert_eq!(config.sp_grid.entropy_points, 200);
        assert_eq!(config.opacity_grid.alpha_points, 50);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = EosConfig::from_yaml_str(
            "workers: 2\nsp_grid:\n  entropy_points: 20\ndroplet_diameter: 0.0\n",
        )
        .unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.sp_grid.entropy_points, 20);
        assert_eq!(config.sp_grid.pressure_points, 200);
        assert_eq!(config.droplet_diameter, 0.0);
        assert_eq!(config.check_tolerance, 0.1);
    }

    #[test]
    fn json_config() {
        let config = EosConfig::from_json_str(r#"{"check_tolerance": 0.05}"#).unwrap();
        assert_eq!(config.check_tolerance, 0.05);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            EosConfig::from_yaml_str("workers: 0\n"),
            Err(EosError::Config { .. })
        ));
        assert!(EosConfig::from_yaml_str("sp_grid:\n  entropy_max: 10.0\n").is_err());
        assert!(EosConfig::from_yaml_str("u_rho_grid:\n  linear_energy_max: 1.0e6\n").is_err());
        assert!(EosConfig::from_yaml_str("min_pressure: -1.0\n").is_err());
    }

    #[test]
    fn energy_axis_concatenates_segments() {
        let grid = URhoGridConfig {
            energy_points: 6,
            ..Default::default()
        };
        let axis = grid.energy_axis().unwrap();
        assert_eq!(axis.len(), 6);
        assert_eq!(axis.values()[0], 0.0);
        assert_eq!(axis.values()[2], 1e5);
        assert!((axis.values()[3] - 10f64.powf(5.1)).abs() < 1e-6);
        assert!((axis.last() - 1e8).abs() < 1e-3);
    }

    #[test]
    fn yaml_file_roundtrip() {
        let path = std::env::temp_dir().join("se_eos_config_test.yaml");
        let config = EosConfig {
            workers: 3,
            ..Default::default()
        };
        config.save_yaml(&path).unwrap();
        assert_eq!(EosConfig::load_yaml(&path).unwrap(), config);
    }
}
