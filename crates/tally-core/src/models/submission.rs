use serde::{Deserialize, Serialize};

/// A raw answer as produced by the upstream structural normalizer.
///
/// Platforms deliver answers as free text or as numbers; `null` answers are
/// represented by the surrounding `Option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// The answer as it was given, for provenance on item observations.
    pub fn display(&self) -> String {
        match self {
            RawValue::Integer(n) => n.to_string(),
            RawValue::Number(x) => x.to_string(),
            RawValue::Text(s) => s.clone(),
        }
    }
}

/// One answered field of a form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionItem {
    pub field_id: String,
    pub raw_value: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Respondent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A structurally-normalized form submission, as handed over by the
/// upstream stage. Field identifiers are platform-specific; resolving them
/// to measure items is the engine's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSubmission {
    pub form_id: String,
    pub submission_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent: Option<Respondent>,
    pub timestamp: String,
    pub items: Vec<SubmissionItem>,
}

impl FormSubmission {
    /// Resolve the subject identifier: `subject_id` wins over
    /// `respondent.id`.
    pub fn subject(&self) -> Option<&str> {
        self.subject_id
            .as_deref()
            .or(self.respondent.as_ref().map(|r| r.id.as_str()))
    }
}
