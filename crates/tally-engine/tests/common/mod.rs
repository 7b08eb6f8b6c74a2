//! Shared fixtures: the shipped registries plus builders for recoded
//! sections and canonical submissions.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tally_core::models::{FormSubmission, RawValue, Respondent, SubmissionItem};
use tally_engine::collector::DiagnosticsCollector;
use tally_engine::recode::{RecodedItem, RecodedSection};
use tally_registry::spec::MeasureSpec;
use tally_registry::{BindingRegistry, MeasureRegistry};

pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("workspace root exists")
        .to_path_buf()
}

pub fn measure_registry() -> MeasureRegistry {
    MeasureRegistry::load(&workspace_root().join("measure-registry"))
        .expect("shipped measure registry loads")
}

pub fn binding_registry() -> BindingRegistry {
    BindingRegistry::load(&workspace_root().join("form-binding-registry"))
        .expect("shipped binding registry loads")
}

pub fn measure(measure_id: &str) -> MeasureSpec {
    measure_registry()
        .get(measure_id, Some("1.0.0"))
        .expect("measure exists")
        .clone()
}

pub fn collector(measure_id: &str) -> DiagnosticsCollector {
    DiagnosticsCollector::new("sub-1", measure_id)
}

/// A recoded section built directly from (item_id, value) pairs; `None`
/// values are missing items.
pub fn section_from_values(
    measure_id: &str,
    values: &[(&str, Option<i64>)],
) -> RecodedSection {
    RecodedSection {
        measure_id: measure_id.to_string(),
        measure_version: "1.0.0".to_string(),
        items: values
            .iter()
            .enumerate()
            .map(|(i, (item_id, value))| RecodedItem {
                item_id: item_id.to_string(),
                position: i as u32 + 1,
                value: *value,
                raw_answer: value.map(|v| v.to_string()),
                missing: value.is_none(),
            })
            .collect(),
    }
}

/// PHQ-9 section with the nine scored item values plus the unscored
/// severity item.
pub fn phq9_section(values: [Option<i64>; 9], severity: i64) -> RecodedSection {
    let mut pairs: Vec<(String, Option<i64>)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("phq9_item{}", i + 1), *v))
        .collect();
    pairs.push(("phq9_item10".to_string(), Some(severity)));

    let borrowed: Vec<(&str, Option<i64>)> =
        pairs.iter().map(|(id, v)| (id.as_str(), *v)).collect();
    section_from_values("phq9", &borrowed)
}

/// A complete submission for the shipped `intake_v1` binding. PHQ-9
/// answers land on entry.101-110 (item 9 is bound by question text) and
/// GAD-7 answers on entry.201-207.
pub fn intake_submission(phq9_answers: [&str; 10], gad7_answers: [&str; 7]) -> FormSubmission {
    let mut items = Vec::new();
    for (i, answer) in phq9_answers.iter().enumerate() {
        let field = format!("entry.{}", 101 + i);
        let question_text = (i == 8)
            .then(|| "Thoughts that you would be better off dead or of hurting yourself in some way".to_string());
        items.push(SubmissionItem {
            field_id: field,
            raw_value: Some(RawValue::Text(answer.to_string())),
            question_text,
        });
    }
    for (i, answer) in gad7_answers.iter().enumerate() {
        items.push(SubmissionItem {
            field_id: format!("entry.{}", 201 + i),
            raw_value: Some(RawValue::Text(answer.to_string())),
            question_text: None,
        });
    }

    FormSubmission {
        form_id: "googleforms::intake_v1".to_string(),
        submission_id: "sub-001".to_string(),
        subject_id: None,
        respondent: Some(Respondent {
            id: "subject-42".to_string(),
            display: None,
        }),
        timestamp: "2026-05-14T09:30:00Z".to_string(),
        items,
    }
}

pub const PHQ9_FULL: [&str; 10] = [
    "not at all",
    "several days",
    "more than half the days",
    "nearly every day",
    "not at all",
    "several days",
    "more than half the days",
    "nearly every day",
    "not at all",
    "somewhat difficult",
];

pub const GAD7_ALL_MAX: [&str; 7] = [
    "nearly every day",
    "nearly every day",
    "nearly every day",
    "nearly every day",
    "nearly every day",
    "nearly every day",
    "nearly every day",
];
