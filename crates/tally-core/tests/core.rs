//! Shared vocabulary behavior: id generation, platform extraction,
//! subject resolution, and wire shapes.

use tally_core::ids::IdGen;
use tally_core::models::{
    FormSubmission, Observation, ObservationKind, RawValue, Respondent, ScoreValue, Source,
    ValueType,
};

#[test]
fn deterministic_ids_are_stable_v5() {
    let ids = IdGen::new(true);
    let a = ids.observation_id("phq9", "sub-1", "phq9_total");
    let b = ids.observation_id("phq9", "sub-1", "phq9_total");
    assert_eq!(a, b);
    assert_eq!(a.get_version_num(), 5);

    // Any component change changes the id.
    assert_ne!(a, ids.observation_id("phq9", "sub-2", "phq9_total"));
    assert_ne!(a, ids.observation_id("phq9", "sub-1", "phq9_item1"));
    assert_ne!(a, ids.event_id("phq9", "sub-1"));
}

#[test]
fn random_ids_are_v4_and_unique() {
    let ids = IdGen::new(false);
    let a = ids.event_id("phq9", "sub-1");
    let b = ids.event_id("phq9", "sub-1");
    assert_ne!(a, b);
    assert_eq!(a.get_version_num(), 4);
}

#[test]
fn platform_is_the_colon_prefix_or_unknown() {
    assert_eq!(Source::platform_of("googleforms::intake_v1"), "googleforms");
    assert_eq!(Source::platform_of("typeform:checkin"), "typeform");
    assert_eq!(Source::platform_of("intake_v1"), "unknown");
    assert_eq!(Source::platform_of("::odd"), "unknown");
}

#[test]
fn subject_id_wins_over_respondent() {
    let mut submission = FormSubmission {
        form_id: "f".to_string(),
        submission_id: "s".to_string(),
        subject_id: Some("primary".to_string()),
        respondent: Some(Respondent {
            id: "secondary".to_string(),
            display: None,
        }),
        timestamp: "2026-01-01T00:00:00Z".to_string(),
        items: Vec::new(),
    };
    assert_eq!(submission.subject(), Some("primary"));

    submission.subject_id = None;
    assert_eq!(submission.subject(), Some("secondary"));

    submission.respondent = None;
    assert_eq!(submission.subject(), None);
}

#[test]
fn raw_values_deserialize_untagged() {
    let parsed: Vec<Option<RawValue>> =
        serde_json::from_str(r#"[ "several days", 2, 2.5, null ]"#).unwrap();
    assert_eq!(
        parsed,
        vec![
            Some(RawValue::Text("several days".to_string())),
            Some(RawValue::Integer(2)),
            Some(RawValue::Number(2.5)),
            None,
        ]
    );
}

#[test]
fn score_values_serialize_as_bare_numbers() {
    let json = serde_json::to_string(&[ScoreValue::Integer(12), ScoreValue::Float(13.5)]).unwrap();
    assert_eq!(json, "[12,13.5]");
}

#[test]
fn observation_omits_empty_optionals_on_the_wire() {
    let observation = Observation {
        schema: "com.tally.observation.v1".to_string(),
        observation_id: IdGen::new(true).observation_id("phq9", "sub-1", "phq9_total"),
        measure_id: "phq9".to_string(),
        code: "phq9_total".to_string(),
        kind: ObservationKind::Scale,
        value: Some(ScoreValue::Integer(12)),
        value_type: ValueType::Integer,
        raw_answer: None,
        label: Some("Moderate".to_string()),
        position: None,
        missing: false,
    };

    let json = serde_json::to_string(&observation).unwrap();
    assert!(json.contains(r#""kind":"scale""#));
    assert!(json.contains(r#""value_type":"integer""#));
    assert!(!json.contains("raw_answer"));
    assert!(!json.contains("position"));
}
