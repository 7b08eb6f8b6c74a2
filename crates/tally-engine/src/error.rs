use thiserror::Error;

use tally_registry::RegistryError;
use tally_registry::spec::MeasureKind;

/// Configuration errors: fatal for the affected submission (or the whole
/// process at startup). Per-record semantic issues are diagnostics, not
/// errors; see `tally_core::models::diagnostics`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("form_id missing from submission and not provided")]
    MissingFormId,

    #[error("no item map configured for form '{form_id}' and measure '{measure_id}'")]
    MissingItemMap { form_id: String, measure_id: String },

    #[error("no domain processor registered for kind {kind:?}")]
    UnknownDomain { kind: MeasureKind },

    #[error("{kind:?} domain processing is not implemented")]
    NotImplemented { kind: MeasureKind },

    #[error("submission contains fields with no binding: {fields:?}")]
    UnmappedFields { fields: Vec<String> },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
