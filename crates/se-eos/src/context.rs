//! Per-material engine context and the material registry.
//!
//! An [`EosContext`] owns everything a query needs for one material: the native
//! table, its forward interpolator, the three derived inverse tables, the saturation
//! model and the opacity model. It is built once, then read concurrently.

use crate::config::EosConfig;
use crate::error::{EosError, EosResult};
use crate::inverse::{ForwardEnergyInversion, InverseEnergyTable, InverseStateTable, TableBuilder};
use crate::opacity::{InverseOpacityTable, OpacityModel};
use crate::phase::{Phase, SaturationModel};
use se_cache::{CachedTable, Fingerprint, TableKind, TableStore};
use se_core::MaterialId;
use se_tables::{DirectInversion, ForwardInterpolator, MaterialTable};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Where a derived table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOrigin {
    Built,
    Cached,
}

/// Origin of each derived table of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOrigins {
    pub inverse_sp: TableOrigin,
    pub inverse_u_rho: TableOrigin,
    pub inverse_opacity: TableOrigin,
}

impl TableOrigins {
    const BUILT: Self = Self {
        inverse_sp: TableOrigin::Built,
        inverse_u_rho: TableOrigin::Built,
        inverse_opacity: TableOrigin::Built,
    };

    pub fn all_cached(&self) -> bool {
        [self.inverse_sp, self.inverse_u_rho, self.inverse_opacity]
            .iter()
            .all(|o| *o == TableOrigin::Cached)
    }
}

/// Fully built engine state for one material.
#[derive(Debug)]
pub struct EosContext {
    material: Arc<MaterialTable>,
    forward: ForwardInterpolator,
    inverse_sp: InverseStateTable,
    inverse_u_rho: InverseEnergyTable,
    saturation: SaturationModel,
    opacity: OpacityModel,
    config: EosConfig,
    origins: TableOrigins,
}

/// Cache key of one derived table, e.g. `m400_inverse_sp_200x200`.
pub fn cache_key(material: MaterialId, kind: TableKind, nx: usize, ny: usize) -> String {
    format!("m{}_{}_{}x{}", material.code(), kind.label(), nx, ny)
}

/// Load `key` from the store, or build and save it when absent.
///
/// A present entry with a different fingerprint is an error, never a silent rebuild.
fn load_or_build<T>(
    store: &TableStore,
    key: &str,
    fingerprint: &Fingerprint,
    load: impl FnOnce(&CachedTable) -> EosResult<T>,
    build: impl FnOnce() -> EosResult<T>,
    save: impl FnOnce(&T) -> CachedTable,
) -> EosResult<(T, TableOrigin)> {
    if store.has(key) {
        let cached = store
            .load(key, fingerprint)
            .inspect_err(|e| tracing::warn!(key, error = %e, "cached table rejected"))?;
        tracing::debug!(key, "loaded cached table");
        return Ok((load(&cached)?, TableOrigin::Cached));
    }
    let table = build()?;
    store.save(&save(&table))?;
    tracing::debug!(key, "saved table to cache");
    Ok((table, TableOrigin::Built))
}

impl EosContext {
    /// Build every derived table from scratch.
    pub fn build(
        material: Arc<MaterialTable>,
        inversion: &dyn DirectInversion,
        config: EosConfig,
    ) -> EosResult<Self> {
        config.validate()?;
        let started = Instant::now();
        let forward = ForwardInterpolator::new(material.clone())?;
        let builder = TableBuilder::new(config.workers, config.residual_threshold)?;

        let inverse_sp = builder.build_sp_table(&forward, &config.sp_grid)?;
        let inverse_u_rho =
            builder.build_energy_table(material.id(), inversion, &config.u_rho_grid)?;
        let inverse_opacity =
            InverseOpacityTable::build(&config.vapor_absorption, &config.opacity_grid)?;

        let ctx = Self::assemble(
            material,
            forward,
            inverse_sp,
            inverse_u_rho,
            inverse_opacity,
            config,
            TableOrigins::BUILT,
        )?;
        tracing::info!(
            material = %ctx.material.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built EOS context"
        );
        Ok(ctx)
    }

    /// Build with the built-in inversion of the forward internal energy.
    pub fn build_with_forward_inversion(
        material: Arc<MaterialTable>,
        config: EosConfig,
    ) -> EosResult<Self> {
        let forward = ForwardInterpolator::new(material.clone())?;
        let inversion = ForwardEnergyInversion::new(&forward);
        Self::build(material, &inversion, config)
    }

    /// Build through a table store: each derived table is loaded when cached and
    /// built then saved otherwise. `inversion = None` selects the built-in forward
    /// energy inversion.
    ///
    /// Fails with a stale-table cache error when an entry exists under the same key
    /// but was built from a different material, grid or model.
    pub fn build_cached(
        material: Arc<MaterialTable>,
        inversion: Option<&dyn DirectInversion>,
        config: EosConfig,
        store: &TableStore,
    ) -> EosResult<Self> {
        config.validate()?;
        let started = Instant::now();
        let forward = ForwardInterpolator::new(material.clone())?;
        let builder = TableBuilder::new(config.workers, config.residual_threshold)?;
        let digest = material.digest();
        let id = material.id();
        let name = material.name().to_string();

        let sp = &config.sp_grid;
        let sp_key = cache_key(
            id,
            TableKind::InverseSp,
            sp.entropy_points,
            sp.pressure_points,
        );
        let sp_fp = Fingerprint::compute(&digest, TableKind::InverseSp.label(), &sp.bounds());
        let (inverse_sp, sp_origin) = load_or_build(
            store,
            &sp_key,
            &sp_fp,
            InverseStateTable::from_cached,
            || builder.build_sp_table(&forward, sp),
            |t| t.to_cached(&sp_key, sp_fp.clone(), &name, sp.bounds()),
        )?;

        let fallback = ForwardEnergyInversion::new(&forward);
        let inversion: &dyn DirectInversion = match inversion {
            Some(inversion) => inversion,
            None => &fallback,
        };
        let ur = &config.u_rho_grid;
        let ur_key = cache_key(
            id,
            TableKind::InverseURho,
            ur.energy_points,
            ur.density_points,
        );
        let ur_fp = Fingerprint::compute(
            &format!("{digest}|{}", inversion.label()),
            TableKind::InverseURho.label(),
            &ur.bounds(),
        );
        let (inverse_u_rho, ur_origin) = load_or_build(
            store,
            &ur_key,
            &ur_fp,
            InverseEnergyTable::from_cached,
            || builder.build_energy_table(id, inversion, ur),
            |t| t.to_cached(&ur_key, ur_fp.clone(), &name, ur.bounds()),
        )?;

        let op = &config.opacity_grid;
        let op_key = cache_key(
            id,
            TableKind::InverseOpacity,
            op.alpha_points,
            op.density_points,
        );
        let op_fp = Fingerprint::compute(
            &format!(
                "{digest}|{}|{}",
                serde_json::to_string(&config.vapor_absorption)?,
                op.initial_temperature
            ),
            TableKind::InverseOpacity.label(),
            &op.bounds(),
        );
        let (inverse_opacity, op_origin) = load_or_build(
            store,
            &op_key,
            &op_fp,
            InverseOpacityTable::from_cached,
            || InverseOpacityTable::build(&config.vapor_absorption, op),
            |t| t.to_cached(&op_key, op_fp.clone(), &name, op.bounds()),
        )?;

        let origins = TableOrigins {
            inverse_sp: sp_origin,
            inverse_u_rho: ur_origin,
            inverse_opacity: op_origin,
        };
        let ctx = Self::assemble(
            material,
            forward,
            inverse_sp,
            inverse_u_rho,
            inverse_opacity,
            config,
            origins,
        )?;
        tracing::info!(
            material = %ctx.material.name(),
            all_cached = origins.all_cached(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "prepared EOS context"
        );
        Ok(ctx)
    }

    fn assemble(
        material: Arc<MaterialTable>,
        forward: ForwardInterpolator,
        inverse_sp: InverseStateTable,
        inverse_u_rho: InverseEnergyTable,
        inverse_opacity: InverseOpacityTable,
        config: EosConfig,
        origins: TableOrigins,
    ) -> EosResult<Self> {
        let saturation = SaturationModel::new(&material, config.min_pressure)?;
        let opacity = OpacityModel::new(
            config.vapor_absorption,
            config.condensed_absorption,
            inverse_opacity,
        );
        Ok(Self {
            material,
            forward,
            inverse_sp,
            inverse_u_rho,
            saturation,
            opacity,
            config,
            origins,
        })
    }

    pub fn id(&self) -> MaterialId {
        self.material.id()
    }

    pub fn material(&self) -> &Arc<MaterialTable> {
        &self.material
    }

    pub fn forward(&self) -> &ForwardInterpolator {
        &self.forward
    }

    pub fn inverse_sp(&self) -> &InverseStateTable {
        &self.inverse_sp
    }

    pub fn inverse_u_rho(&self) -> &InverseEnergyTable {
        &self.inverse_u_rho
    }

    pub fn saturation(&self) -> &SaturationModel {
        &self.saturation
    }

    pub fn opacity(&self) -> &OpacityModel {
        &self.opacity
    }

    pub fn config(&self) -> &EosConfig {
        &self.config
    }

    pub fn origins(&self) -> TableOrigins {
        self.origins
    }

    pub fn phase(&self, s: f64, p: f64) -> Phase {
        self.saturation.phase(s, p)
    }

    pub fn vapor_quality(&self, s: f64, p: f64) -> f64 {
        self.saturation.vapor_quality(s, p)
    }

    /// Total absorption coefficient with the configured droplet diameter.
    pub fn alpha_total(&self, rho: f64, t: f64, p: f64, s: f64) -> f64 {
        self.alpha_total_with(rho, t, p, s, self.config.droplet_diameter)
    }

    /// Total absorption coefficient for droplets of diameter `d0` (0 disables them).
    pub fn alpha_total_with(&self, rho: f64, t: f64, p: f64, s: f64, d0: f64) -> f64 {
        self.opacity.alpha_total(&self.saturation, rho, t, p, s, d0)
    }
}

/// Engine contexts keyed by material identifier.
#[derive(Debug, Default, Clone)]
pub struct EosRegistry {
    contexts: BTreeMap<MaterialId, Arc<EosContext>>,
}

impl EosRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a context; returns the one it replaces.
    pub fn insert(&mut self, context: EosContext) -> Option<Arc<EosContext>> {
        self.contexts.insert(context.id(), Arc::new(context))
    }

    pub fn get(&self, id: MaterialId) -> EosResult<&Arc<EosContext>> {
        self.contexts
            .get(&id)
            .ok_or(EosError::UnknownMaterial { id })
    }

    pub fn contains(&self, id: MaterialId) -> bool {
        self.contexts.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = MaterialId> + '_ {
        self.contexts.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MaterialId, &Arc<EosContext>)> {
        self.contexts.iter()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
