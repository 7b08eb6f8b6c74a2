use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::diagnostics::Diagnostics;

/// Envelope discriminators carried on every emitted record.
pub const MEASUREMENT_EVENT_SCHEMA: &str = "com.tally.measurement_event.v1";
pub const OBSERVATION_SCHEMA: &str = "com.tally.observation.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    Item,
    Scale,
}

/// A scored value. Item values are always integers; scale scores become
/// floats when proration or averaging produced a fractional result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Integer(i64),
    Float(f64),
}

impl ScoreValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            ScoreValue::Integer(n) => *n as f64,
            ScoreValue::Float(x) => *x,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ScoreValue::Integer(_) => ValueType::Integer,
            ScoreValue::Float(_) => ValueType::Float,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Integer,
    Float,
    Null,
}

/// A single scored atom inside a measurement event: either one item's
/// recoded value or one scale's computed score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub schema: String,
    pub observation_id: Uuid,
    pub measure_id: String,
    /// item_id or scale_id, depending on `kind`.
    pub code: String,
    pub kind: ObservationKind,
    pub value: Option<ScoreValue>,
    pub value_type: ValueType,
    /// Original answer text, items only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_answer: Option<String>,
    /// Interpretation label, scales only, when a band matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    pub missing: bool,
}

/// Provenance of the submission a measurement event was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub form_id: String,
    /// First component of a colon-prefixed form_id, else "unknown".
    pub platform: String,
    pub submission_id: String,
    pub binding_id: String,
    pub binding_version: String,
}

impl Source {
    /// Extract the platform tag from a form identifier like
    /// `googleforms::intake_v1`.
    pub fn platform_of(form_id: &str) -> String {
        match form_id.split_once(':') {
            Some((platform, _)) if !platform.is_empty() => platform.to_string(),
            _ => "unknown".to_string(),
        }
    }
}

/// Processing provenance recorded on every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    pub processor: String,
    pub processor_version: String,
    pub processed_at: String,
    pub items_observed: u32,
    pub scales_observed: u32,
}

/// The top-level output record: one per (submission, measure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementEvent {
    pub schema: String,
    pub measurement_event_id: Uuid,
    pub measure_id: String,
    pub measure_version: String,
    pub subject_id: String,
    pub timestamp: String,
    pub source: Source,
    pub observations: Vec<Observation>,
    pub telemetry: Telemetry,
}

/// Result of processing a single form submission: the generated events plus
/// one diagnostics record per targeted measure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub form_submission_id: String,
    pub success: bool,
    pub events: Vec<MeasurementEvent>,
    pub diagnostics: Vec<Diagnostics>,
}

impl ProcessingResult {
    /// Merge results produced by different domain processors for the same
    /// submission.
    pub fn merge(mut self, other: ProcessingResult) -> ProcessingResult {
        self.success = self.success && other.success;
        self.events.extend(other.events);
        self.diagnostics.extend(other.diagnostics);
        self
    }
}
