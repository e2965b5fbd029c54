use se_cache::*;
use std::collections::BTreeMap;

fn sample_table(key: &str, fingerprint: Fingerprint) -> CachedTable {
    let mut fields = BTreeMap::new();
    fields.insert("rho".to_string(), vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0]);
    fields.insert("t".to_string(), vec![10.0, 20.0, 30.0, 40.0, f64::NAN, 60.0]);
    CachedTable {
        key: key.to_string(),
        fingerprint,
        kind: TableKind::InverseSp,
        material: "forsterite".to_string(),
        grid: vec![AxisBounds::new(0.0, 2.0, 3), AxisBounds::new(-1.0, 1.0, 2)],
        x: vec![0.0, 1.0, 2.0],
        y: vec![-1.0, 1.0],
        fields,
    }
}

fn fresh_store(name: &str) -> TableStore {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    TableStore::new(dir).unwrap()
}

#[test]
fn save_and_load_table() {
    let store = fresh_store("se_cache_roundtrip");
    let fp = Fingerprint::compute("digest", "inverse_sp", &[AxisBounds::new(0.0, 2.0, 3)]);
    let table = sample_table("forsterite_sp", fp.clone());

    store.save(&table).unwrap();
    assert!(store.has("forsterite_sp"));

    let loaded = store.load("forsterite_sp", &fp).unwrap();
    assert_eq!(loaded.kind, TableKind::InverseSp);
    assert_eq!(loaded.x, table.x);
    assert_eq!(loaded.y, table.y);

    let rho = loaded.field("rho").unwrap();
    assert_eq!(rho.len(), 6);
    assert_eq!(rho[0], 1.0);
    assert!(rho[2].is_nan());
    assert!(loaded.field("t").unwrap()[4].is_nan());

    let manifest = store.load_manifest("forsterite_sp").unwrap();
    assert_eq!((manifest.nx, manifest.ny), (3, 2));
    assert!(chrono::DateTime::parse_from_rfc3339(&manifest.timestamp).is_ok());
}

#[test]
fn stale_fingerprint_fails_loudly() {
    let store = fresh_store("se_cache_stale");
    let built_with = Fingerprint::compute("old-digest", "inverse_sp", &[]);
    store.save(&sample_table("stale", built_with.clone())).unwrap();

    let expected = Fingerprint::compute("new-digest", "inverse_sp", &[]);
    match store.load("stale", &expected) {
        Err(CacheError::StaleTable {
            key,
            expected: e,
            found,
        }) => {
            assert_eq!(key, "stale");
            assert_eq!(e, expected.to_string());
            assert_eq!(found, built_with.to_string());
        }
        other => panic!("expected StaleTable, got {other:?}"),
    }
}

#[test]
fn shape_mismatch_is_rejected_on_save() {
    let store = fresh_store("se_cache_shape");
    let mut table = sample_table("bad", Fingerprint::from_hex("ff"));
    table.fields.insert("extra".to_string(), vec![1.0]);
    assert!(matches!(store.save(&table), Err(CacheError::Corrupt { .. })));
}

#[test]
fn list_and_delete() {
    let store = fresh_store("se_cache_list");
    store
        .save(&sample_table("b_table", Fingerprint::from_hex("01")))
        .unwrap();
    store
        .save(&sample_table("a_table", Fingerprint::from_hex("02")))
        .unwrap();

    let keys: Vec<_> = store.list().unwrap().into_iter().map(|m| m.key).collect();
    assert_eq!(keys, vec!["a_table", "b_table"]);

    store.delete("a_table").unwrap();
    assert!(!store.has("a_table"));
    assert!(store.has("b_table"));
}
