use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry path missing: {0}")]
    PathMissing(PathBuf),

    #[error("{kind} spec not found: {id}@{version}")]
    NotFound {
        kind: &'static str,
        id: String,
        version: String,
    },

    #[error("duplicate {kind} spec: {id}@{version}")]
    DuplicateSpec {
        kind: &'static str,
        id: String,
        version: String,
    },

    #[error("schema violation in {}: {detail}", path.display())]
    SchemaViolation { path: PathBuf, detail: String },

    #[error("invalid spec {}: {detail}", path.display())]
    InvalidSpec { path: PathBuf, detail: String },

    #[error("invalid version file name '{name}' in {}", path.display())]
    InvalidVersionFile { path: PathBuf, name: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
