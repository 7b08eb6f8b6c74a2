//! Item-map store: per-(form, measure) `field_id -> item_id` maps.
//!
//! One JSON file per pair under `<root>/<form_id>/<measure_id>.json`.
//! Reads happen on the submission path; saves and deletes are
//! administrative actions that never run during processing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemMapMeta {
    created_at: jiff::Timestamp,
    updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemMapFile {
    form_id: String,
    measure_id: String,
    item_map: BTreeMap<String, String>,
    meta: ItemMapMeta,
}

pub struct ItemMapStore {
    root: PathBuf,
}

impl ItemMapStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The `field_id -> item_id` map for this pair, or `None` when no map
    /// has been configured.
    pub fn item_map(
        &self,
        form_id: &str,
        measure_id: &str,
    ) -> Result<Option<BTreeMap<String, String>>, RegistryError> {
        let path = self.map_path(form_id, measure_id);
        if !path.exists() {
            return Ok(None);
        }
        let file = self.read(&path)?;
        Ok(Some(file.item_map))
    }

    /// Persist a map for this pair, preserving `created_at` across saves.
    pub fn save_item_map(
        &self,
        form_id: &str,
        measure_id: &str,
        item_map: BTreeMap<String, String>,
    ) -> Result<(), RegistryError> {
        let path = self.map_path(form_id, measure_id);
        let now = jiff::Timestamp::now();

        let created_at = if path.exists() {
            self.read(&path)?.meta.created_at
        } else {
            now
        };

        let file = ItemMapFile {
            form_id: form_id.to_string(),
            measure_id: measure_id.to_string(),
            item_map,
            meta: ItemMapMeta {
                created_at,
                updated_at: now,
            },
        };

        let dir = path.parent().expect("map path has a parent directory");
        std::fs::create_dir_all(dir).map_err(|source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let json = serde_json::to_string_pretty(&file).map_err(|source| RegistryError::Parse {
            path: path.clone(),
            source,
        })?;

        // Write to a temp file then rename for atomicity
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json.as_bytes()).map_err(|source| RegistryError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|source| RegistryError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(form_id, measure_id, path = %path.display(), "item map saved");
        Ok(())
    }

    /// Measure ids with a configured map for this form.
    pub fn mapped_measures(&self, form_id: &str) -> Result<Vec<String>, RegistryError> {
        let dir = self.root.join(sanitize(form_id));
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|source| RegistryError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut measures = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RegistryError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json")
                && let Some(stem) = path.file_stem()
            {
                measures.push(stem.to_string_lossy().into_owned());
            }
        }
        measures.sort();
        Ok(measures)
    }

    /// Remove a map. Returns whether one existed.
    pub fn delete_item_map(&self, form_id: &str, measure_id: &str) -> Result<bool, RegistryError> {
        let path = self.map_path(form_id, measure_id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(|source| RegistryError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(form_id, measure_id, "item map deleted");
        Ok(true)
    }

    fn read(&self, path: &Path) -> Result<ItemMapFile, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn map_path(&self, form_id: &str, measure_id: &str) -> PathBuf {
        self.root
            .join(sanitize(form_id))
            .join(format!("{measure_id}.json"))
    }
}

/// Form ids may carry platform prefixes like `googleforms::intake_v1`;
/// keep them filesystem-safe.
fn sanitize(form_id: &str) -> String {
    form_id.replace(['/', ':'], "_")
}
