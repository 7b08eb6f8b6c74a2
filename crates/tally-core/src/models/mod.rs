pub mod diagnostics;
pub mod event;
pub mod submission;

pub use diagnostics::{Diagnostic, DiagnosticSummary, Diagnostics};
pub use event::{
    MeasurementEvent, Observation, ObservationKind, ProcessingResult, ScoreValue, Source,
    Telemetry, ValueType,
};
pub use submission::{FormSubmission, RawValue, Respondent, SubmissionItem};
