use serde::{Deserialize, Serialize};

/// Diagnostic codes emitted by the pipeline stages. Codes are the log:
/// no free-form per-record text is written anywhere else.
pub mod code {
    pub const MISSING_BINDING: &str = "MISSING_BINDING";
    pub const DUPLICATE_FIELD: &str = "DUPLICATE_FIELD";
    pub const UNRECOGNIZED_VALUE: &str = "UNRECOGNIZED_VALUE";
    pub const VALUE_OUT_OF_RANGE: &str = "VALUE_OUT_OF_RANGE";
    pub const UNKNOWN_ITEM: &str = "UNKNOWN_ITEM";
    pub const SCALE_INCOMPLETE: &str = "SCALE_INCOMPLETE";
    pub const SCALE_NOT_SCORABLE: &str = "SCALE_NOT_SCORABLE";
    pub const SCALE_OUT_OF_RANGE: &str = "SCALE_OUT_OF_RANGE";
    pub const NO_INTERPRETATION_BAND: &str = "NO_INTERPRETATION_BAND";
    pub const UNMAPPED_FIELD_SKIPPED: &str = "UNMAPPED_FIELD_SKIPPED";
}

/// One recorded error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    pub items_present: u32,
    pub items_missing: u32,
    pub scales_scored: u32,
    pub scales_not_scorable: u32,
}

/// The per-(submission, measure) diagnostics record. Errors are the
/// critical subset: a record with any error is not a success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    pub submission_id: String,
    pub measure_id: String,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub summary: DiagnosticSummary,
}

impl Diagnostics {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
