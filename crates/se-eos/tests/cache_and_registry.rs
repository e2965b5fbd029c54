mod common;

use common::*;
use se_cache::{CacheError, TableKind, TableStore};
use se_core::MaterialId;
use se_eos::{EosConfig, EosContext, EosError, EosRegistry, SpGridConfig, cache_key};

fn small_config() -> EosConfig {
    EosConfig {
        sp_grid: SpGridConfig {
            entropy_min: 3000.0,
            entropy_max: 8000.0,
            entropy_points: 12,
            log_pressure_min: 4.0,
            log_pressure_max: 8.0,
            pressure_points: 10,
        },
        ..test_config()
    }
}

fn same_or_both_nan(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

#[test]
fn second_build_loads_every_table_from_cache() {
    let store = TableStore::new(fresh_dir("se_eos_cache_reload")).unwrap();
    let material = ideal_gas_material(400, 20);

    let first = EosContext::build_cached(
        material.clone(),
        Some(&ideal_inversion),
        small_config(),
        &store,
    )
    .unwrap();
    assert!(!first.origins().all_cached());
    let key = cache_key(material.id(), TableKind::InverseSp, 12, 10);
    assert!(store.has(&key));

    let second =
        EosContext::build_cached(material, Some(&ideal_inversion), small_config(), &store)
            .unwrap();
    assert!(second.origins().all_cached());

    for (s, p) in [(4000.0, 1e5), (5500.0, 3e6), (7000.0, 5e4)] {
        let (r1, t1) = first.inverse_sp().lookup(s, p);
        let (r2, t2) = second.inverse_sp().lookup(s, p);
        assert!(same_or_both_nan(r1, r2) && same_or_both_nan(t1, t2));
    }
    assert_eq!(
        first.inverse_u_rho().temperature(2e6, 1.0),
        second.inverse_u_rho().temperature(2e6, 1.0)
    );
    assert_eq!(
        first.opacity().temperature_for_alpha(0.1, 1.0),
        second.opacity().temperature_for_alpha(0.1, 1.0)
    );
}

#[test]
fn changed_grid_bounds_fail_loudly() {
    let store = TableStore::new(fresh_dir("se_eos_cache_stale")).unwrap();
    let material = ideal_gas_material(400, 20);
    EosContext::build_cached(
        material.clone(),
        Some(&ideal_inversion),
        small_config(),
        &store,
    )
    .unwrap();

    // same resolution, so same key, but a different grid
    let mut config = small_config();
    config.sp_grid.entropy_max = 9000.0;
    let err = EosContext::build_cached(material, Some(&ideal_inversion), config, &store)
        .unwrap_err();
    assert!(matches!(
        err,
        EosError::Cache(CacheError::StaleTable { .. })
    ));
}

#[test]
fn changed_inversion_primitive_fails_loudly() {
    let store = TableStore::new(fresh_dir("se_eos_cache_inversion")).unwrap();
    let material = ideal_gas_material(400, 20);
    EosContext::build_cached(
        material.clone(),
        Some(&ideal_inversion),
        small_config(),
        &store,
    )
    .unwrap();

    let err = EosContext::build_cached(material, None, small_config(), &store).unwrap_err();
    assert!(matches!(
        err,
        EosError::Cache(CacheError::StaleTable { ref key, .. }) if key.contains("inverse_u_rho")
    ));
}

#[test]
fn deleted_table_is_rebuilt() {
    let store = TableStore::new(fresh_dir("se_eos_cache_rebuild")).unwrap();
    let material = ideal_gas_material(400, 20);
    EosContext::build_cached(
        material.clone(),
        Some(&ideal_inversion),
        small_config(),
        &store,
    )
    .unwrap();

    let key = cache_key(material.id(), TableKind::InverseOpacity, 50, 50);
    store.delete(&key).unwrap();
    let ctx = EosContext::build_cached(material, Some(&ideal_inversion), small_config(), &store)
        .unwrap();
    let origins = ctx.origins();
    assert_eq!(origins.inverse_sp, se_eos::TableOrigin::Cached);
    assert_eq!(origins.inverse_opacity, se_eos::TableOrigin::Built);
    assert!(store.has(&key));
}

#[test]
fn registry_keeps_materials_apart() {
    let mut registry = EosRegistry::new();
    for code in [400, 410] {
        let ctx =
            EosContext::build(ideal_gas_material(code, 20), &ideal_inversion, small_config())
                .unwrap();
        assert!(registry.insert(ctx).is_none());
    }
    assert_eq!(registry.len(), 2);
    let ids: Vec<u32> = registry.ids().map(|id| id.code()).collect();
    assert_eq!(ids, vec![400, 410]);

    let ctx = registry.get(MaterialId::new(410).unwrap()).unwrap();
    assert_eq!(ctx.id().code(), 410);
    assert_eq!(ctx.material().name(), "ideal-gas-410");

    let err = registry.get(MaterialId::new(999).unwrap()).unwrap_err();
    assert!(matches!(err, EosError::UnknownMaterial { .. }));
}

#[test]
fn invalid_configuration_is_rejected_before_building() {
    let config = EosConfig {
        workers: 0,
        ..small_config()
    };
    let err = EosContext::build(ideal_gas_material(400, 20), &ideal_inversion, config)
        .unwrap_err();
    assert!(matches!(err, EosError::Config { .. }));
}
