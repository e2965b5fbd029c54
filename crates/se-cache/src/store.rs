//! Table storage API.

use crate::types::{CachedTable, TableData, TableManifest, from_nullable, to_nullable};
use crate::{CacheError, CacheResult, Fingerprint};
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";
const DATA_FILE: &str = "data.json";

#[derive(Clone, Debug)]
pub struct TableStore {
    root_dir: PathBuf,
}

impl TableStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let root_dir = root_dir.into();
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn table_dir(&self, key: &str) -> CacheResult<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(CacheError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root_dir.join(key))
    }

    pub fn has(&self, key: &str) -> bool {
        self.table_dir(key)
            .map(|dir| dir.join(MANIFEST_FILE).exists() && dir.join(DATA_FILE).exists())
            .unwrap_or(false)
    }

    pub fn save(&self, table: &CachedTable) -> CacheResult<()> {
        let nx = table.x.len();
        let ny = table.y.len();
        for (name, values) in &table.fields {
            if values.len() != nx * ny {
                return Err(CacheError::Corrupt {
                    key: table.key.clone(),
                    what: format!(
                        "field {name} has {} values, expected {nx}x{ny}",
                        values.len()
                    ),
                });
            }
        }

        let dir = self.table_dir(&table.key)?;
        fs::create_dir_all(&dir)?;

        let manifest = TableManifest {
            key: table.key.clone(),
            fingerprint: table.fingerprint.clone(),
            kind: table.kind,
            material: table.material.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            nx,
            ny,
            grid: table.grid.clone(),
            fields: table.fields.keys().cloned().collect(),
        };
        let data = TableData {
            x: to_nullable(&table.x),
            y: to_nullable(&table.y),
            fields: table
                .fields
                .iter()
                .map(|(name, values)| (name.clone(), to_nullable(values)))
                .collect(),
        };

        // data first: a manifest only exists next to complete data
        fs::write(dir.join(DATA_FILE), serde_json::to_string(&data)?)?;
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        tracing::debug!(key = %table.key, kind = table.kind.label(), nx, ny, "saved cached table");
        Ok(())
    }

    pub fn load_manifest(&self, key: &str) -> CacheResult<TableManifest> {
        let path = self.table_dir(key)?.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(CacheError::NotFound {
                key: key.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load a table, failing with [`CacheError::StaleTable`] when it was built from
    /// different inputs than `expected` describes.
    pub fn load(&self, key: &str, expected: &Fingerprint) -> CacheResult<CachedTable> {
        let manifest = self.load_manifest(key)?;
        if &manifest.fingerprint != expected {
            tracing::warn!(
                key,
                expected = %expected,
                found = %manifest.fingerprint,
                "cached table fingerprint mismatch"
            );
            return Err(CacheError::StaleTable {
                key: key.to_string(),
                expected: expected.to_string(),
                found: manifest.fingerprint.to_string(),
            });
        }

        let data_path = self.table_dir(key)?.join(DATA_FILE);
        if !data_path.exists() {
            return Err(CacheError::NotFound {
                key: key.to_string(),
            });
        }
        let data: TableData = serde_json::from_str(&fs::read_to_string(data_path)?)?;

        if data.x.len() != manifest.nx || data.y.len() != manifest.ny {
            return Err(CacheError::Corrupt {
                key: key.to_string(),
                what: format!(
                    "axes have {}x{} points, manifest says {}x{}",
                    data.x.len(),
                    data.y.len(),
                    manifest.nx,
                    manifest.ny
                ),
            });
        }
        let cells = manifest.nx * manifest.ny;
        let mut fields = std::collections::BTreeMap::new();
        for (name, values) in &data.fields {
            if values.len() != cells {
                return Err(CacheError::Corrupt {
                    key: key.to_string(),
                    what: format!("field {name} has {} values, expected {cells}", values.len()),
                });
            }
            fields.insert(name.clone(), from_nullable(values));
        }

        Ok(CachedTable {
            key: manifest.key,
            fingerprint: manifest.fingerprint,
            kind: manifest.kind,
            material: manifest.material,
            grid: manifest.grid,
            x: from_nullable(&data.x),
            y: from_nullable(&data.y),
            fields,
        })
    }

    pub fn list(&self) -> CacheResult<Vec<TableManifest>> {
        let mut manifests = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let key = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&key) {
                    manifests.push(manifest);
                }
            }
        }
        manifests.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(manifests)
    }

    pub fn delete(&self, key: &str) -> CacheResult<()> {
        let dir = self.table_dir(key)?;
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_like_keys() {
        let store = TableStore::new(std::env::temp_dir().join("se_cache_keys")).unwrap();
        assert!(matches!(
            store.load_manifest("../escape"),
            Err(CacheError::InvalidKey { .. })
        ));
        assert!(matches!(
            store.load_manifest(""),
            Err(CacheError::InvalidKey { .. })
        ));
        assert!(!store.has("a/b"));
    }

    #[test]
    fn missing_table_is_not_found() {
        let store = TableStore::new(std::env::temp_dir().join("se_cache_missing")).unwrap();
        assert!(matches!(
            store.load("nothing_here", &Fingerprint::from_hex("00")),
            Err(CacheError::NotFound { .. })
        ));
    }
}
