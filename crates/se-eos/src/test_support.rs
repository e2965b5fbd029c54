//! Synthetic materials shared by unit tests.

use se_core::MaterialId;
use se_tables::{
    CriticalPoint, MaterialTable, MaterialTableData, ReferenceState, SaturationCurve,
};
use std::sync::Arc;

pub const R_GAS: f64 = 500.0;
pub const CV: f64 = 1000.0;

/// Ideal-gas entropy with S(1000 K, 1 kg/m^3) = 5000.
pub fn ideal_entropy(rho: f64, t: f64) -> f64 {
    5000.0 + CV * (t / 1000.0).ln() - R_GAS * rho.ln()
}

fn logspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 10f64.powf(a + (b - a) * i as f64 / (n - 1) as f64))
        .collect()
}

/// Saturation dome with its critical point at S = 4000, P = 2e7.
pub fn dome() -> (SaturationCurve, CriticalPoint) {
    (
        SaturationCurve {
            liquid_entropy: vec![1000.0, 2000.0, 3000.0, 4000.0],
            liquid_pressure: vec![1e2, 1e5, 3e6, 2e7],
            liquid_density: vec![3000.0, 2800.0, 2400.0, 1000.0],
            vapor_entropy: vec![16000.0, 10000.0, 6000.0, 4000.0],
            vapor_pressure: vec![1e2, 1e5, 3e6, 2e7],
        },
        CriticalPoint {
            entropy: 4000.0,
            pressure: 2e7,
        },
    )
}

/// Ideal gas (P = R rho T, u = cv T) on an `n x n` log-spaced grid with the dome
/// saturation curve attached.
pub fn ideal_gas(n: usize) -> Arc<MaterialTable> {
    let density = logspace(-3.0, 3.0, n);
    let temperature = logspace(2.5, 4.0, n);
    let mut pressure = Vec::with_capacity(n * n);
    let mut entropy = Vec::with_capacity(n * n);
    let mut internal_energy = Vec::with_capacity(n * n);
    let mut sound_speed = Vec::with_capacity(n * n);
    for &t in &temperature {
        for &rho in &density {
            pressure.push(R_GAS * rho * t);
            entropy.push(ideal_entropy(rho, t));
            internal_energy.push(CV * t);
            sound_speed.push((1.4 * R_GAS * t).sqrt());
        }
    }
    let (saturation, critical) = dome();
    Arc::new(
        MaterialTable::new(MaterialTableData {
            id: MaterialId::new(400).unwrap(),
            name: "ideal-gas".to_string(),
            density,
            temperature,
            pressure,
            entropy,
            internal_energy,
            sound_speed,
            critical,
            reference: ReferenceState {
                density: 3220.0,
                bulk_modulus: 1.1e11,
            },
            saturation,
        })
        .unwrap(),
    )
}

pub fn dome_material() -> Arc<MaterialTable> {
    ideal_gas(5)
}
