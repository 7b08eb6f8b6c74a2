//! Per-(submission, measure) diagnostics accumulation.
//!
//! Diagnostics are the log: stages record codes here instead of writing
//! free-form text anywhere.

use tally_core::models::{Diagnostic, DiagnosticSummary, Diagnostics};

pub struct DiagnosticsCollector {
    submission_id: String,
    measure_id: String,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    pub fn new(submission_id: impl Into<String>, measure_id: impl Into<String>) -> Self {
        Self {
            submission_id: submission_id.into(),
            measure_id: measure_id.into(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a critical diagnostic. Any error makes the record a failure.
    pub fn error(&mut self, code: &str, detail: impl Into<String>, item_id: Option<&str>) {
        self.errors.push(Diagnostic {
            code: code.to_string(),
            detail: detail.into(),
            item_id: item_id.map(str::to_string),
        });
    }

    pub fn warning(&mut self, code: &str, detail: impl Into<String>, item_id: Option<&str>) {
        self.warnings.push(Diagnostic {
            code: code.to_string(),
            detail: detail.into(),
            item_id: item_id.map(str::to_string),
        });
    }

    pub fn finish(self, summary: DiagnosticSummary) -> Diagnostics {
        Diagnostics {
            submission_id: self.submission_id,
            measure_id: self.measure_id,
            errors: self.errors,
            warnings: self.warnings,
            summary,
        }
    }
}
