//! Inverse table builder.
//!
//! Derives lookup tables keyed by variable pairs other than the native (rho, T):
//!
//! - [`InverseStateTable`]: (X, log10 Y) -> (rho, T), by Nelder–Mead inversion of the
//!   forward model seeded from the nearest native grid cell. The entropy–pressure
//!   table is the standard instance.
//! - [`InverseEnergyTable`]: (u, log10 rho) -> T, filled by a [`DirectInversion`]
//!   primitive.
//!
//! Rows are independent tasks on a fixed-width rayon pool. Each task owns its row;
//! the coordinator places finished rows by index once every task has returned.
//! Non-convergent cells keep the minimizer's best point and its residual and are
//! reported in the build log, never failing the build.

use crate::config::{SpGridConfig, URhoGridConfig};
use crate::error::EosResult;
use crate::opacity::cached_field;
use nalgebra::DVector;
use rayon::prelude::*;
use se_cache::{AxisBounds, CachedTable, Fingerprint, TableKind};
use se_core::{MaterialId, frac_error};
use se_solver::{NelderMeadConfig, nelder_mead};
use se_tables::{Axis, DirectInversion, ForwardEos, MaterialTable, Property, Table2d};
use std::collections::BTreeMap;
use std::time::Instant;

/// Pair of forward properties an inverse table is keyed by. The table's y axis is
/// `log10` of the second property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InversePair {
    pub x: Property,
    pub y: Property,
}

impl InversePair {
    /// (S, log10 P) -> (rho, T)
    pub const ENTROPY_PRESSURE: Self = Self {
        x: Property::Entropy,
        y: Property::Pressure,
    };
}

/// One finished row of a table build.
#[derive(Debug, Clone)]
pub struct RowResult<T> {
    pub index: usize,
    pub cells: Vec<T>,
}

/// Inverted state at one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateCell {
    pub density: f64,
    pub temperature: f64,
    /// `sqrt(fe_x^2 + fe_y^2)` at the accepted point
    pub residual: f64,
}

impl StateCell {
    pub const UNDEFINED: Self = Self {
        density: f64::NAN,
        temperature: f64::NAN,
        residual: f64::NAN,
    };
}

/// A cell whose residual exceeds the flagging threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlaggedCell {
    pub ix: usize,
    pub iy: usize,
    pub residual: f64,
}

/// Builds inverse tables on a dedicated worker pool.
pub struct TableBuilder {
    pool: rayon::ThreadPool,
    residual_threshold: f64,
    minimizer: NelderMeadConfig,
}

impl TableBuilder {
    pub fn new(workers: usize, residual_threshold: f64) -> EosResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("eos-table-{i}"))
            .build()?;
        Ok(Self {
            pool,
            residual_threshold,
            minimizer: NelderMeadConfig::default(),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn residual_threshold(&self) -> f64 {
        self.residual_threshold
    }

    /// Scatter `rows` row tasks over the pool and gather them by row index.
    fn map_rows<T, F>(&self, rows: usize, task: F) -> Vec<RowResult<T>>
    where
        T: Send,
        F: Fn(usize) -> Vec<T> + Sync,
    {
        self.pool.install(|| {
            (0..rows)
                .into_par_iter()
                .map(|index| {
                    let cells = task(index);
                    tracing::debug!(row = index, "row finished");
                    RowResult { index, cells }
                })
                .collect()
        })
    }

    /// Entropy–pressure table on the configured grid.
    pub fn build_sp_table(
        &self,
        forward: &dyn ForwardEos,
        grid: &SpGridConfig,
    ) -> EosResult<InverseStateTable> {
        self.build_state_table(
            forward,
            InversePair::ENTROPY_PRESSURE,
            grid.entropy_axis()?,
            grid.log_pressure_axis()?,
        )
    }

    /// (X, log10 Y) -> (rho, T) table over the given axes.
    pub fn build_state_table(
        &self,
        forward: &dyn ForwardEos,
        pair: InversePair,
        x_axis: Axis,
        log_y_axis: Axis,
    ) -> EosResult<InverseStateTable> {
        let started = Instant::now();
        let (nx, ny) = (x_axis.len(), log_y_axis.len());
        tracing::info!(
            material = forward.name(),
            x = ?pair.x,
            y = ?pair.y,
            nx,
            ny,
            workers = self.workers(),
            "building inverse state table"
        );

        let rows = self.map_rows(ny, |iy| {
            let y = 10f64.powf(log_y_axis.values()[iy]);
            x_axis
                .values()
                .iter()
                .map(|&x| invert_cell(forward, pair, x, y, &self.minimizer))
                .collect()
        });
        let cells = assemble(rows, nx, ny, StateCell::UNDEFINED);

        let density = cells.iter().map(|c| c.density).collect();
        let temperature = cells.iter().map(|c| c.temperature).collect();
        let residuals: Vec<f64> = cells.iter().map(|c| c.residual).collect();
        let table = InverseStateTable {
            pair,
            density: Table2d::new(x_axis.clone(), log_y_axis.clone(), density)?,
            temperature: Table2d::new(x_axis, log_y_axis, temperature)?,
            residuals,
        };

        let flagged = table.flagged_cells(self.residual_threshold).len();
        let undefined = table.residuals.iter().filter(|r| r.is_nan()).count();
        if flagged > 0 {
            tracing::warn!(
                flagged,
                threshold = self.residual_threshold,
                "inverse cells above residual threshold"
            );
        }
        tracing::info!(
            undefined,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built inverse state table"
        );
        Ok(table)
    }

    /// Energy–density table on the configured grid.
    pub fn build_energy_table(
        &self,
        material: MaterialId,
        inversion: &dyn DirectInversion,
        grid: &URhoGridConfig,
    ) -> EosResult<InverseEnergyTable> {
        self.build_energy_table_on(
            material,
            inversion,
            grid.energy_axis()?,
            grid.log_density_axis()?,
        )
    }

    /// (u, log10 rho) -> T table over the given axes. Row `i` is the density
    /// `10^log_density_axis[i]`.
    pub fn build_energy_table_on(
        &self,
        material: MaterialId,
        inversion: &dyn DirectInversion,
        energy_axis: Axis,
        log_density_axis: Axis,
    ) -> EosResult<InverseEnergyTable> {
        let started = Instant::now();
        let (nx, ny) = (energy_axis.len(), log_density_axis.len());
        tracing::info!(%material, nx, ny, workers = self.workers(), "building inverse energy table");

        let rows = self.map_rows(ny, |iy| {
            let rho = 10f64.powf(log_density_axis.values()[iy]);
            energy_axis
                .values()
                .iter()
                .map(|&u| inversion.temperature(u, rho, material))
                .collect()
        });
        let values = assemble(rows, nx, ny, f64::NAN);
        let undefined = values.iter().filter(|t| t.is_nan()).count();

        tracing::info!(
            undefined,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built inverse energy table"
        );
        Ok(InverseEnergyTable {
            temperature: Table2d::new(energy_axis, log_density_axis, values)?,
        })
    }
}

/// Place rows into a row-major `ny x nx` array by their index.
fn assemble<T: Copy>(rows: Vec<RowResult<T>>, nx: usize, ny: usize, fill: T) -> Vec<T> {
    let mut values = vec![fill; nx * ny];
    for row in rows {
        if row.index < ny && row.cells.len() == nx {
            values[row.index * nx..(row.index + 1) * nx].copy_from_slice(&row.cells);
        } else {
            tracing::warn!(row = row.index, len = row.cells.len(), "discarding malformed row");
        }
    }
    values
}

/// Native grid node `(rho, T)` minimizing `sqrt(fe(X)^2 + fe(Y)^2)` against the targets.
fn nearest_native_cell(
    material: &MaterialTable,
    pair: InversePair,
    x: f64,
    y: f64,
) -> Option<(f64, f64)> {
    let rho_axis = material.density_axis().values();
    let t_axis = material.temperature_axis().values();
    let xs = material.values(pair.x);
    let ys = material.values(pair.y);
    let n_rho = rho_axis.len();

    let mut best: Option<(usize, f64)> = None;
    for (k, (&vx, &vy)) in xs.iter().zip(ys).enumerate() {
        let err = frac_error(vx, x).hypot(frac_error(vy, y));
        if !err.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, e)| err < e) {
            best = Some((k, err));
        }
    }
    best.map(|(k, _)| (rho_axis[k % n_rho], t_axis[k / n_rho]))
}

fn invert_cell(
    forward: &dyn ForwardEos,
    pair: InversePair,
    x: f64,
    y: f64,
    config: &NelderMeadConfig,
) -> StateCell {
    let Some((rho0, t0)) = nearest_native_cell(forward.material(), pair, x, y) else {
        return StateCell::UNDEFINED;
    };
    let objective = |z: &DVector<f64>| {
        frac_error(forward.property(pair.x, z[0], z[1]), x).powi(2)
            + frac_error(forward.property(pair.y, z[0], z[1]), y).powi(2)
    };
    match nelder_mead(DVector::from_vec(vec![rho0, t0]), objective, config) {
        Ok(res) if res.f.is_finite() => StateCell {
            density: res.x[0],
            temperature: res.x[1],
            residual: res.f.sqrt(),
        },
        _ => StateCell::UNDEFINED,
    }
}

/// (X, log10 Y) -> (rho, T) table with per-cell residuals.
#[derive(Debug, Clone)]
pub struct InverseStateTable {
    pair: InversePair,
    density: Table2d,
    temperature: Table2d,
    residuals: Vec<f64>,
}

impl InverseStateTable {
    pub fn pair(&self) -> InversePair {
        self.pair
    }

    pub fn x_axis(&self) -> &Axis {
        self.density.x_axis()
    }

    pub fn log_y_axis(&self) -> &Axis {
        self.density.y_axis()
    }

    /// Density at (x, y); `y` is in linear units.
    pub fn density(&self, x: f64, y: f64) -> f64 {
        self.density.eval(x, y.log10())
    }

    /// Temperature at (x, y); `y` is in linear units.
    pub fn temperature(&self, x: f64, y: f64) -> f64 {
        self.temperature.eval(x, y.log10())
    }

    pub fn lookup(&self, x: f64, y: f64) -> (f64, f64) {
        (self.density(x, y), self.temperature(x, y))
    }

    pub fn density_table(&self) -> &Table2d {
        &self.density
    }

    pub fn temperature_table(&self) -> &Table2d {
        &self.temperature
    }

    /// Row-major residuals, NaN where no seed cell existed.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    pub fn flagged_cells(&self, threshold: f64) -> Vec<FlaggedCell> {
        let nx = self.x_axis().len();
        self.residuals
            .iter()
            .enumerate()
            .filter(|(_, r)| **r > threshold)
            .map(|(k, &residual)| FlaggedCell {
                ix: k % nx,
                iy: k / nx,
                residual,
            })
            .collect()
    }

    pub fn to_cached(
        &self,
        key: &str,
        fingerprint: Fingerprint,
        material: &str,
        grid: Vec<AxisBounds>,
    ) -> CachedTable {
        let mut fields = BTreeMap::new();
        fields.insert("density".to_string(), self.density.values().to_vec());
        fields.insert("temperature".to_string(), self.temperature.values().to_vec());
        fields.insert("residual".to_string(), self.residuals.clone());
        CachedTable {
            key: key.to_string(),
            fingerprint,
            kind: TableKind::InverseSp,
            material: material.to_string(),
            grid,
            x: self.x_axis().values().to_vec(),
            y: self.log_y_axis().values().to_vec(),
            fields,
        }
    }

    /// Restore an entropy–pressure table from the cache.
    pub fn from_cached(cached: &CachedTable) -> EosResult<Self> {
        let x = Axis::new(cached.x.clone())?;
        let y = Axis::new(cached.y.clone())?;
        Ok(Self {
            pair: InversePair::ENTROPY_PRESSURE,
            density: Table2d::new(x.clone(), y.clone(), cached_field(cached, "density")?)?,
            temperature: Table2d::new(x, y, cached_field(cached, "temperature")?)?,
            residuals: cached_field(cached, "residual")?,
        })
    }
}

/// (u, log10 rho) -> T table.
#[derive(Debug, Clone)]
pub struct InverseEnergyTable {
    temperature: Table2d,
}

impl InverseEnergyTable {
    /// Temperature at specific internal energy `u` and density `rho`.
    pub fn temperature(&self, u: f64, rho: f64) -> f64 {
        self.temperature.eval(u, rho.log10())
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
            kind: TableKind::InverseURho,
            material: material.to_string(),
            grid,
            x: self.temperature.x_axis().values().to_vec(),
            y: self.temperature.y_axis().values().to_vec(),
            fields,
        }
    }

    pub fn from_cached(cached: &CachedTable) -> EosResult<Self> {
        Ok(Self {
            temperature: Table2d::new(
                Axis::new(cached.x.clone())?,
                Axis::new(cached.y.clone())?,
                cached_field(cached, "temperature")?,
            )?,
        })
    }
}

/// Built-in (u, rho) -> T inversion of the forward internal energy, for materials
/// without an external inversion primitive.
///
/// Seeds from the nearest native density column and the closest energy in it, then
/// minimizes `fe(u(rho, T), u)` over T. Requests for another material return NaN.
pub struct ForwardEnergyInversion<'a> {
    forward: &'a dyn ForwardEos,
    config: NelderMeadConfig,
}

impl<'a> ForwardEnergyInversion<'a> {
    pub fn new(forward: &'a dyn ForwardEos) -> Self {
        Self {
            forward,
            config: NelderMeadConfig::default(),
        }
    }
}

impl DirectInversion for ForwardEnergyInversion<'_> {
    fn temperature(&self, u: f64, rho: f64, material: MaterialId) -> f64 {
        let table = self.forward.material();
        if material != table.id() || u.is_nan() || rho.is_nan() {
            return f64::NAN;
        }

        let rho_axis = table.density_axis().values();
        let j = rho_axis
            .iter()
            .enumerate()
            .map(|(j, &r)| (j, frac_error(r, rho)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(j, _)| j);
        let Some(j) = j else {
            return f64::NAN;
        };
        let i = (0..table.temperature_axis().len())
            .map(|i| (i, frac_error(table.value_at(Property::InternalEnergy, i, j), u)))
            .filter(|(_, e)| e.is_finite())
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);
        let Some(i) = i else {
            return f64::NAN;
        };

        let t0 = table.temperature_axis().values()[i];
        let objective =
            |z: &DVector<f64>| frac_error(self.forward.property(Property::InternalEnergy, rho, z[0]), u);
        match nelder_mead(DVector::from_vec(vec![t0]), objective, &self.config) {
            Ok(res) if res.f.is_finite() => res.x[0],
            _ => f64::NAN,
        }
    }

    fn label(&self) -> &str {
        "forward-energy"
    }
}
