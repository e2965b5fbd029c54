#![allow(dead_code)]

use se_core::MaterialId;
use se_eos::{EosConfig, EosContext, OpacityGridConfig, SpGridConfig, URhoGridConfig};
use se_tables::{
    CriticalPoint, MaterialTable, MaterialTableData, ReferenceState, SaturationCurve,
};
use std::sync::{Arc, OnceLock};

pub const R_GAS: f64 = 500.0;
pub const CV: f64 = 1000.0;

pub fn ideal_entropy(rho: f64, t: f64) -> f64 {
    5000.0 + CV * (t / 1000.0).ln() - R_GAS * rho.ln()
}

pub fn ideal_pressure(rho: f64, t: f64) -> f64 {
    R_GAS * rho * t
}

pub fn logspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 10f64.powf(a + (b - a) * i as f64 / (n - 1) as f64))
        .collect()
}

/// Ideal gas on a wide native grid with a saturation dome whose apex sits at
/// S = 4000 J/kg/K, P = 2e7 Pa.
pub fn ideal_gas_material(code: u32, n: usize) -> Arc<MaterialTable> {
    let density = logspace(-4.0, 3.0, n);
    let temperature = logspace(2.5, 5.0, n);
    let mut pressure = Vec::with_capacity(n * n);
    let mut entropy = Vec::with_capacity(n * n);
    let mut internal_energy = Vec::with_capacity(n * n);
    let mut sound_speed = Vec::with_capacity(n * n);
    for &t in &temperature {
        for &rho in &density {
            pressure.push(ideal_pressure(rho, t));
            entropy.push(ideal_entropy(rho, t));
            internal_energy.push(CV * t);
            sound_speed.push((1.4 * R_GAS * t).sqrt());
        }
    }
    Arc::new(
        MaterialTable::new(MaterialTableData {
            id: MaterialId::new(code).unwrap(),
            name: format!("ideal-gas-{code}"),
            density,
            temperature,
            pressure,
            entropy,
            internal_energy,
            sound_speed,
            critical: CriticalPoint {
                entropy: 4000.0,
                pressure: 2e7,
            },
            reference: ReferenceState {
                density: 3220.0,
                bulk_modulus: 1.1e11,
            },
            saturation: SaturationCurve {
                liquid_entropy: vec![1000.0, 2000.0, 3000.0, 4000.0],
                liquid_pressure: vec![1e2, 1e5, 3e6, 2e7],
                liquid_density: vec![3000.0, 2800.0, 2400.0, 1000.0],
                vapor_entropy: vec![16000.0, 10000.0, 6000.0, 4000.0],
                vapor_pressure: vec![1e2, 1e5, 3e6, 2e7],
            },
        })
        .unwrap(),
    )
}

/// Exact (u, rho) -> T of the ideal gas.
pub fn ideal_inversion(u: f64, _rho: f64, _material: MaterialId) -> f64 {
    u / CV
}

pub fn test_config() -> EosConfig {
    EosConfig {
        sp_grid: SpGridConfig {
            entropy_min: 300.0,
            entropy_max: 11000.0,
            entropy_points: 60,
            log_pressure_min: 2.0,
            log_pressure_max: 10.0,
            pressure_points: 60,
        },
        u_rho_grid: URhoGridConfig {
            energy_points: 60,
            log_density_min: -4.0,
            log_density_max: 3.0,
            density_points: 30,
            ..Default::default()
        },
        opacity_grid: OpacityGridConfig::default(),
        workers: 4,
        ..Default::default()
    }
}

/// Context shared by every test of one test binary.
pub fn shared_context() -> &'static EosContext {
    static CONTEXT: OnceLock<EosContext> = OnceLock::new();
    CONTEXT.get_or_init(|| {
        EosContext::build(ideal_gas_material(400, 40), &ideal_inversion, test_config()).unwrap()
    })
}

pub fn fresh_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}
