//! Forward interpolation: (ρ, T) → (P, S, u, c_s).

use crate::coords::CoordinatePairs;
use crate::error::TableResult;
use crate::interp::Table2d;
use crate::material::{MaterialTable, Property};
use std::sync::Arc;

/// Properties evaluated at one (ρ, T) point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForwardProperties {
    /// Pressure [Pa]
    pub pressure: f64,
    /// Specific entropy [J/(kg·K)]
    pub entropy: f64,
    /// Specific internal energy [J/kg]
    pub internal_energy: f64,
    /// Sound speed [m/s]
    pub sound_speed: f64,
}

impl ForwardProperties {
    pub const NAN: Self = Self {
        pressure: f64::NAN,
        entropy: f64::NAN,
        internal_energy: f64::NAN,
        sound_speed: f64::NAN,
    };

    pub fn get(&self, property: Property) -> f64 {
        match property {
            Property::Pressure => self.pressure,
            Property::Entropy => self.entropy,
            Property::InternalEnergy => self.internal_energy,
            Property::SoundSpeed => self.sound_speed,
        }
    }
}

/// Forward equation of state evaluated on (density, temperature).
///
/// Implementations must be thread-safe (Send + Sync): the inverse-table builder
/// evaluates them from every worker of its pool.
pub trait ForwardEos: Send + Sync {
    /// Model name (for logging).
    fn name(&self) -> &str;

    /// Native table backing this model; used to seed inversions.
    fn material(&self) -> &MaterialTable;

    /// Evaluate one property; NaN outside the valid domain.
    fn property(&self, property: Property, rho: f64, t: f64) -> f64;

    /// Evaluate all properties at once.
    fn lookup(&self, rho: f64, t: f64) -> ForwardProperties {
        ForwardProperties {
            pressure: self.property(Property::Pressure, rho, t),
            entropy: self.property(Property::Entropy, rho, t),
            internal_energy: self.property(Property::InternalEnergy, rho, t),
            sound_speed: self.property(Property::SoundSpeed, rho, t),
        }
    }
}

/// Bilinear forward interpolator over a material's native (ρ, T) grid.
///
/// Immutable and safe for concurrent reads.
#[derive(Debug, Clone)]
pub struct ForwardInterpolator {
    material: Arc<MaterialTable>,
    pressure: Table2d,
    entropy: Table2d,
    internal_energy: Table2d,
    sound_speed: Table2d,
}

impl ForwardInterpolator {
    pub fn new(material: Arc<MaterialTable>) -> TableResult<Self> {
        let grid = |property: Property| -> TableResult<Table2d> {
            Table2d::new(
                material.density_axis().clone(),
                material.temperature_axis().clone(),
                material.values(property).to_vec(),
            )
        };
        Ok(Self {
            pressure: grid(Property::Pressure)?,
            entropy: grid(Property::Entropy)?,
            internal_energy: grid(Property::InternalEnergy)?,
            sound_speed: grid(Property::SoundSpeed)?,
            material,
        })
    }

    pub fn material_arc(&self) -> &Arc<MaterialTable> {
        &self.material
    }

    fn table(&self, property: Property) -> &Table2d {
        match property {
            Property::Pressure => &self.pressure,
            Property::Entropy => &self.entropy,
            Property::InternalEnergy => &self.internal_energy,
            Property::SoundSpeed => &self.sound_speed,
        }
    }

    pub fn pressure(&self, rho: f64, t: f64) -> f64 {
        self.pressure.eval(rho, t)
    }

    pub fn entropy(&self, rho: f64, t: f64) -> f64 {
        self.entropy.eval(rho, t)
    }

    pub fn internal_energy(&self, rho: f64, t: f64) -> f64 {
        self.internal_energy.eval(rho, t)
    }

    pub fn sound_speed(&self, rho: f64, t: f64) -> f64 {
        self.sound_speed.eval(rho, t)
    }

    /// Element-wise lookup over (ρ, T) pairs.
    pub fn lookup_pairs(&self, pairs: &CoordinatePairs) -> Vec<ForwardProperties> {
        pairs.iter().map(|(rho, t)| self.lookup(rho, t)).collect()
    }

    /// Element-wise lookup from two equal-length slices.
    pub fn lookup_slices(&self, rho: &[f64], t: &[f64]) -> TableResult<Vec<ForwardProperties>> {
        Ok(self.lookup_pairs(&CoordinatePairs::from_slices(rho, t)?))
    }
}

impl ForwardEos for ForwardInterpolator {
    fn name(&self) -> &str {
        self.material.name()
    }

    fn material(&self) -> &MaterialTable {
        &self.material
    }

    fn property(&self, property: Property, rho: f64, t: f64) -> f64 {
        self.table(property).eval(rho, t)
    }
}
