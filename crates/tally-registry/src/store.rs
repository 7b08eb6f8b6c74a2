//! Filesystem registries for measure and binding specs.
//!
//! Layout: `<root>/measures/<measure_id>/<M-m-p>.json` (and
//! `<root>/bindings/<binding_id>/…`), where the file stem is the version
//! with hyphens instead of dots. Everything is read once at startup and
//! indexed immutably; lookups never touch the disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::RegistryError;
use crate::schema::SpecSchema;
use crate::spec::{FormBindingSpec, MeasureSpec};

/// Version components parsed from a `M-m-p` file stem. Ordering on the
/// tuple is the registry's notion of "latest".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct VersionKey(u64, u64, u64);

impl VersionKey {
    fn from_stem(stem: &str) -> Option<Self> {
        let mut parts = stem.split('-');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(VersionKey(major, minor, patch))
    }

    fn from_version(version: &str) -> Option<Self> {
        Self::from_stem(&version.replace('.', "-"))
    }

    fn dotted(&self) -> String {
        format!("{}.{}.{}", self.0, self.1, self.2)
    }
}

/// One raw spec document found on disk, already schema-checked.
struct RawSpec {
    id: String,
    version: VersionKey,
    path: PathBuf,
    doc: Value,
}

/// Scan `<dir>/<id>/<M-m-p>.json`, schema-checking every document.
fn scan(dir: &Path, kind: &'static str, schema: &SpecSchema) -> Result<Vec<RawSpec>, RegistryError> {
    if !dir.is_dir() {
        return Err(RegistryError::PathMissing(dir.to_path_buf()));
    }

    let mut specs = Vec::new();
    let mut id_dirs: Vec<PathBuf> = read_dir_sorted(dir)?;
    id_dirs.retain(|p| p.is_dir());

    for id_dir in id_dirs {
        let id = id_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for file in read_dir_sorted(&id_dir)? {
            if file.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stem = file
                .file_stem()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let version =
                VersionKey::from_stem(&stem).ok_or_else(|| RegistryError::InvalidVersionFile {
                    path: id_dir.clone(),
                    name: stem.clone(),
                })?;

            let content = std::fs::read_to_string(&file).map_err(|source| RegistryError::Io {
                path: file.clone(),
                source,
            })?;
            let doc: Value =
                serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
                    path: file.clone(),
                    source,
                })?;

            if let Err(violations) = schema.check(&doc) {
                return Err(RegistryError::SchemaViolation {
                    path: file.clone(),
                    detail: violations.join("; "),
                });
            }

            specs.push(RawSpec {
                id: id.clone(),
                version,
                path: file,
                doc,
            });
        }
    }

    tracing::debug!(kind, count = specs.len(), dir = %dir.display(), "registry scan complete");
    Ok(specs)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let entries = std::fs::read_dir(dir).map_err(|source| RegistryError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

/// Cross-check the identifiers inside a document against its location,
/// then insert, rejecting duplicates.
fn index_spec<T>(
    tree: &mut BTreeMap<String, BTreeMap<VersionKey, T>>,
    raw: &RawSpec,
    kind: &'static str,
    doc_id: &str,
    doc_version: &str,
    spec: T,
) -> Result<(), RegistryError> {
    if doc_id != raw.id {
        return Err(RegistryError::InvalidSpec {
            path: raw.path.clone(),
            detail: format!("document id '{doc_id}' does not match directory '{}'", raw.id),
        });
    }
    if VersionKey::from_version(doc_version) != Some(raw.version) {
        return Err(RegistryError::InvalidSpec {
            path: raw.path.clone(),
            detail: format!(
                "document version '{doc_version}' does not match file name '{}'",
                raw.version.dotted().replace('.', "-")
            ),
        });
    }

    let versions = tree.entry(raw.id.clone()).or_default();
    if versions.insert(raw.version, spec).is_some() {
        return Err(RegistryError::DuplicateSpec {
            kind,
            id: raw.id.clone(),
            version: raw.version.dotted(),
        });
    }
    Ok(())
}

fn lookup<'a, T>(
    tree: &'a BTreeMap<String, BTreeMap<VersionKey, T>>,
    kind: &'static str,
    id: &str,
    version: Option<&str>,
) -> Result<&'a T, RegistryError> {
    let not_found = |version: &str| RegistryError::NotFound {
        kind,
        id: id.to_string(),
        version: version.to_string(),
    };

    let versions = tree.get(id).ok_or_else(|| not_found(version.unwrap_or("latest")))?;
    match version {
        Some(v) => {
            let key = VersionKey::from_version(v).ok_or_else(|| not_found(v))?;
            versions.get(&key).ok_or_else(|| not_found(v))
        }
        // Latest by numeric component ordering.
        None => versions
            .last_key_value()
            .map(|(_, spec)| spec)
            .ok_or_else(|| not_found("latest")),
    }
}

/// Read-only registry of measure specs.
#[derive(Debug)]
pub struct MeasureRegistry {
    specs: BTreeMap<String, BTreeMap<VersionKey, MeasureSpec>>,
}

impl MeasureRegistry {
    /// Scan, schema-validate, semantically validate, and index every
    /// measure spec under `<root>/measures/`. Any violation is fatal.
    pub fn load(root: &Path) -> Result<Self, RegistryError> {
        let schema = SpecSchema::measure_spec();
        let mut specs: BTreeMap<String, BTreeMap<VersionKey, MeasureSpec>> = BTreeMap::new();

        for raw in scan(&root.join("measures"), "measure", &schema)? {
            let spec: MeasureSpec =
                serde_json::from_value(raw.doc.clone()).map_err(|source| RegistryError::Parse {
                    path: raw.path.clone(),
                    source,
                })?;

            let problems = spec.validate();
            if !problems.is_empty() {
                return Err(RegistryError::InvalidSpec {
                    path: raw.path.clone(),
                    detail: problems.join("; "),
                });
            }

            let (id, version) = (spec.measure_id.clone(), spec.version.clone());
            index_spec(&mut specs, &raw, "measure", &id, &version, spec)?;
        }

        Ok(Self { specs })
    }

    /// Fetch a measure spec; `None` means the latest version.
    pub fn get(&self, measure_id: &str, version: Option<&str>) -> Result<&MeasureSpec, RegistryError> {
        lookup(&self.specs, "measure", measure_id, version)
    }

    pub fn measure_ids(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// All known versions of a measure, oldest first.
    pub fn versions(&self, measure_id: &str) -> Vec<String> {
        self.specs
            .get(measure_id)
            .map(|v| v.keys().map(VersionKey::dotted).collect())
            .unwrap_or_default()
    }
}

/// Read-only registry of form binding specs.
pub struct BindingRegistry {
    specs: BTreeMap<String, BTreeMap<VersionKey, FormBindingSpec>>,
}

impl BindingRegistry {
    /// Scan, schema-validate, and index every binding spec under
    /// `<root>/bindings/`.
    pub fn load(root: &Path) -> Result<Self, RegistryError> {
        let schema = SpecSchema::form_binding_spec();
        let mut specs: BTreeMap<String, BTreeMap<VersionKey, FormBindingSpec>> = BTreeMap::new();

        for raw in scan(&root.join("bindings"), "binding", &schema)? {
            let spec: FormBindingSpec =
                serde_json::from_value(raw.doc.clone()).map_err(|source| RegistryError::Parse {
                    path: raw.path.clone(),
                    source,
                })?;

            let (id, version) = (spec.binding_id.clone(), spec.version.clone());
            index_spec(&mut specs, &raw, "binding", &id, &version, spec)?;
        }

        Ok(Self { specs })
    }

    /// Fetch a binding spec; `None` means the latest version.
    pub fn get(&self, binding_id: &str, version: Option<&str>) -> Result<&FormBindingSpec, RegistryError> {
        lookup(&self.specs, "binding", binding_id, version)
    }

    pub fn binding_ids(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }
}
