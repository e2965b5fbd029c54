//! Tabulated material data.
//!
//! A [`MaterialTable`] is the immutable per-material dataset everything else is derived
//! from: a (density, temperature) grid with pressure, entropy, internal energy and sound
//! speed, the saturation (vapor) curve, and the critical/reference constants. Units are
//! normalised to SI once, in [`MaterialTable::from_raw`]; nothing mutates the table after
//! construction.

use crate::axis::Axis;
use crate::error::{TableError, TableResult};
use se_core::{MaterialId, ensure_finite, ensure_positive};
use sha2::{Digest, Sha256};

/// Thermodynamic property stored on the native (ρ, T) grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Pressure,
    Entropy,
    InternalEnergy,
    SoundSpeed,
}

impl Property {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pressure => "pressure [Pa]",
            Self::Entropy => "entropy [J/(kg K)]",
            Self::InternalEnergy => "internal energy [J/kg]",
            Self::SoundSpeed => "sound speed [m/s]",
        }
    }
}

/// Critical point of the liquid–vapor transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalPoint {
    /// Specific entropy [J/(kg·K)]
    pub entropy: f64,
    /// Pressure [Pa]
    pub pressure: f64,
}

/// Reference state of the condensed material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceState {
    /// Density [kg/m³]
    pub density: f64,
    /// Bulk modulus [Pa]
    pub bulk_modulus: f64,
}

/// Liquid and vapor branches of the saturation curve, each ordered from the triple
/// point to the critical point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaturationCurve {
    pub liquid_entropy: Vec<f64>,
    pub liquid_pressure: Vec<f64>,
    pub liquid_density: Vec<f64>,
    pub vapor_entropy: Vec<f64>,
    pub vapor_pressure: Vec<f64>,
}

/// Unit scale factors applied once at load time to reach SI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitScale {
    pub density: f64,
    pub pressure: f64,
    pub entropy: f64,
    pub internal_energy: f64,
    pub sound_speed: f64,
}

impl UnitScale {
    /// Data already in SI.
    pub const SI: Self = Self {
        density: 1.0,
        pressure: 1.0,
        entropy: 1.0,
        internal_energy: 1.0,
        sound_speed: 1.0,
    };

    /// ANEOS extended SESAME output: g/cm³, GPa, MJ/(K·kg), MJ/kg; sound speed
    /// scaled by 1e2.
    pub const ANEOS_SESAME: Self = Self {
        density: 1e3,
        pressure: 1e9,
        entropy: 1e6,
        internal_energy: 1e6,
        sound_speed: 1e2,
    };
}

/// Raw payload supplied by a material-table provider.
///
/// 2-D arrays are row-major, indexed `(temperature, density)`:
/// `pressure[i_t * density.len() + i_rho]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTableData {
    pub id: MaterialId,
    pub name: String,
    pub density: Vec<f64>,
    pub temperature: Vec<f64>,
    pub pressure: Vec<f64>,
    pub entropy: Vec<f64>,
    pub internal_energy: Vec<f64>,
    pub sound_speed: Vec<f64>,
    pub critical: CriticalPoint,
    pub reference: ReferenceState,
    pub saturation: SaturationCurve,
}

/// Validated, SI-normalised material table.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTable {
    id: MaterialId,
    name: String,
    density: Axis,
    temperature: Axis,
    pressure: Vec<f64>,
    entropy: Vec<f64>,
    internal_energy: Vec<f64>,
    sound_speed: Vec<f64>,
    critical: CriticalPoint,
    reference: ReferenceState,
    saturation: SaturationCurve,
}

impl MaterialTable {
    /// Validate a payload that is already in SI units.
    pub fn new(data: MaterialTableData) -> TableResult<Self> {
        Self::from_raw(data, UnitScale::SI)
    }

    /// Validate a payload and scale every field into SI.
    pub fn from_raw(data: MaterialTableData, scale: UnitScale) -> TableResult<Self> {
        let scaled = |v: Vec<f64>, f: f64| -> Vec<f64> { v.into_iter().map(|x| x * f).collect() };

        let density = Axis::new(scaled(data.density, scale.density)).map_err(|e| {
            TableError::InvalidTable {
                what: format!("density axis: {e}"),
            }
        })?;
        let temperature = Axis::new(data.temperature).map_err(|e| TableError::InvalidTable {
            what: format!("temperature axis: {e}"),
        })?;

        let cells = density.len() * temperature.len();
        let grid = |name: &str, v: Vec<f64>, f: f64| -> TableResult<Vec<f64>> {
            if v.len() != cells {
                return Err(TableError::InvalidTable {
                    what: format!("{name} has {} values, grid has {cells} cells", v.len()),
                });
            }
            Ok(scaled(v, f))
        };

        let pressure = grid("pressure", data.pressure, scale.pressure)?;
        let entropy = grid("entropy", data.entropy, scale.entropy)?;
        let internal_energy = grid(
            "internal energy",
            data.internal_energy,
            scale.internal_energy,
        )?;
        let sound_speed = grid("sound speed", data.sound_speed, scale.sound_speed)?;

        let sat = data.saturation;
        let n_l = sat.liquid_entropy.len();
        if sat.liquid_pressure.len() != n_l || sat.liquid_density.len() != n_l {
            return Err(TableError::InvalidTable {
                what: "liquid saturation branch arrays differ in length".to_string(),
            });
        }
        if sat.vapor_pressure.len() != sat.vapor_entropy.len() {
            return Err(TableError::InvalidTable {
                what: "vapor saturation branch arrays differ in length".to_string(),
            });
        }
        if n_l < 2 || sat.vapor_entropy.len() < 2 {
            return Err(TableError::InvalidTable {
                what: "saturation branches need at least 2 points".to_string(),
            });
        }
        let saturation = SaturationCurve {
            liquid_entropy: scaled(sat.liquid_entropy, scale.entropy),
            liquid_pressure: scaled(sat.liquid_pressure, scale.pressure),
            liquid_density: scaled(sat.liquid_density, scale.density),
            vapor_entropy: scaled(sat.vapor_entropy, scale.entropy),
            vapor_pressure: scaled(sat.vapor_pressure, scale.pressure),
        };

        let critical = CriticalPoint {
            entropy: ensure_finite(data.critical.entropy * scale.entropy, "critical entropy")?,
            pressure: ensure_positive(
                data.critical.pressure * scale.pressure,
                "critical pressure",
            )?,
        };
        let reference = ReferenceState {
            density: ensure_positive(data.reference.density * scale.density, "reference density")?,
            bulk_modulus: ensure_positive(
                data.reference.bulk_modulus * scale.pressure,
                "reference bulk modulus",
            )?,
        };

        Ok(Self {
            id: data.id,
            name: data.name,
            density,
            temperature,
            pressure,
            entropy,
            internal_energy,
            sound_speed,
            critical,
            reference,
            saturation,
        })
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn density_axis(&self) -> &Axis {
        &self.density
    }

    pub fn temperature_axis(&self) -> &Axis {
        &self.temperature
    }

    /// Row-major (temperature, density) values of a property.
    pub fn values(&self, property: Property) -> &[f64] {
        match property {
            Property::Pressure => &self.pressure,
            Property::Entropy => &self.entropy,
            Property::InternalEnergy => &self.internal_energy,
            Property::SoundSpeed => &self.sound_speed,
        }
    }

    /// Native grid value at temperature index `i_t`, density index `i_rho`.
    pub fn value_at(&self, property: Property, i_t: usize, i_rho: usize) -> f64 {
        self.values(property)[i_t * self.density.len() + i_rho]
    }

    pub fn critical(&self) -> CriticalPoint {
        self.critical
    }

    pub fn reference(&self) -> ReferenceState {
        self.reference
    }

    pub fn saturation(&self) -> &SaturationCurve {
        &self.saturation
    }

    /// SHA-256 over the identity, axes and arrays; ties derived tables to this exact data.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.code().to_le_bytes());
        hasher.update(self.name.as_bytes());

        let mut feed = |values: &[f64]| {
            hasher.update((values.len() as u64).to_le_bytes());
            for v in values {
                hasher.update(v.to_le_bytes());
            }
        };
        feed(self.density.values());
        feed(self.temperature.values());
        feed(&self.pressure);
        feed(&self.entropy);
        feed(&self.internal_energy);
        feed(&self.sound_speed);
        feed(&[self.critical.entropy, self.critical.pressure]);
        feed(&[self.reference.density, self.reference.bulk_modulus]);
        feed(&self.saturation.liquid_entropy);
        feed(&self.saturation.liquid_pressure);
        feed(&self.saturation.liquid_density);
        feed(&self.saturation.vapor_entropy);
        feed(&self.saturation.vapor_pressure);

        format!("{:x}", hasher.finalize())
    }
}
