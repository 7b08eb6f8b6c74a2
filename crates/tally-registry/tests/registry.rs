//! Registry loading: the shipped registries, version ordering, schema and
//! invariant enforcement, and duplicate rejection.

use std::path::{Path, PathBuf};

use tally_registry::spec::{MeasureKind, ScoringMethod};
use tally_registry::{BindingRegistry, MeasureRegistry, RegistryError};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("workspace root exists")
        .to_path_buf()
}

fn shipped_measures() -> MeasureRegistry {
    MeasureRegistry::load(&workspace_root().join("measure-registry")).unwrap()
}

/// A minimal valid measure document for synthetic registries.
fn minimal_measure(measure_id: &str, version: &str) -> serde_json::Value {
    serde_json::json!({
        "measure_id": measure_id,
        "version": version,
        "name": "Test Measure",
        "kind": "questionnaire",
        "items": [
            {
                "item_id": format!("{measure_id}_item1"),
                "position": 1,
                "text": "First question",
                "response_map": { "no": 0, "yes": 1 },
                "min_value": 0,
                "max_value": 1
            }
        ],
        "scales": [
            {
                "scale_id": format!("{measure_id}_total"),
                "name": "Total",
                "items": [format!("{measure_id}_item1")],
                "method": "sum",
                "min": 0,
                "max": 1,
                "interpretations": [
                    { "min": 0, "max": 0, "label": "Absent", "severity": 0 },
                    { "min": 1, "max": 1, "label": "Present", "severity": 1 }
                ]
            }
        ]
    })
}

fn write_measure(root: &Path, measure_id: &str, file_stem: &str, doc: &serde_json::Value) {
    let dir = root.join("measures").join(measure_id);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{file_stem}.json")),
        serde_json::to_string_pretty(doc).unwrap(),
    )
    .unwrap();
}

#[test]
fn shipped_registry_loads_all_measures() {
    let registry = shipped_measures();
    let ids: Vec<&str> = registry.measure_ids().collect();
    assert!(ids.contains(&"phq9"));
    assert!(ids.contains(&"gad7"));
    assert!(ids.contains(&"phlms10"));
}

#[test]
fn phq9_structure_is_as_published() {
    let registry = shipped_measures();
    let spec = registry.get("phq9", Some("1.0.0")).unwrap();

    assert_eq!(spec.kind, MeasureKind::Questionnaire);
    assert_eq!(spec.items.len(), 10);

    let total = spec.scale("phq9_total").unwrap();
    assert_eq!(total.items.len(), 9);
    assert_eq!(total.method, ScoringMethod::Sum);
    assert_eq!((total.min, total.max), (0, 27));
    assert_eq!(total.interpretations.len(), 5);
}

#[test]
fn shipped_binding_resolves_with_its_measures() {
    let bindings = BindingRegistry::load(&workspace_root().join("form-binding-registry")).unwrap();
    let binding = bindings.get("intake_v1", None).unwrap();

    assert_eq!(binding.form_id, "googleforms::intake_v1");
    let measures = shipped_measures();
    for section in &binding.sections {
        let spec = measures
            .get(&section.measure_id, Some(&section.measure_version))
            .unwrap();
        for item_binding in &section.bindings {
            assert!(
                spec.item(&item_binding.item_id).is_some(),
                "binding targets unknown item {}",
                item_binding.item_id
            );
        }
    }
}

#[test]
fn latest_version_orders_numerically_not_lexicographically() {
    let dir = tempfile::tempdir().unwrap();
    write_measure(dir.path(), "m1", "1-0-0", &minimal_measure("m1", "1.0.0"));
    write_measure(dir.path(), "m1", "1-10-0", &minimal_measure("m1", "1.10.0"));
    write_measure(dir.path(), "m1", "1-9-0", &minimal_measure("m1", "1.9.0"));

    let registry = MeasureRegistry::load(dir.path()).unwrap();
    assert_eq!(registry.get("m1", None).unwrap().version, "1.10.0");
    assert_eq!(
        registry.versions("m1"),
        vec!["1.0.0".to_string(), "1.9.0".to_string(), "1.10.0".to_string()]
    );
}

#[test]
fn unknown_measure_and_version_are_not_found() {
    let registry = shipped_measures();
    assert!(matches!(
        registry.get("nope", None),
        Err(RegistryError::NotFound { .. })
    ));
    assert!(matches!(
        registry.get("phq9", Some("9.9.9")),
        Err(RegistryError::NotFound { .. })
    ));
}

#[test]
fn missing_registry_path_is_fatal() {
    let err = MeasureRegistry::load(Path::new("/nonexistent/registry")).unwrap_err();
    assert!(matches!(err, RegistryError::PathMissing(_)));
}

#[test]
fn schema_violation_is_fatal_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = minimal_measure("m1", "1.0.0");
    doc.as_object_mut().unwrap().remove("kind");
    write_measure(dir.path(), "m1", "1-0-0", &doc);

    let err = MeasureRegistry::load(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::SchemaViolation { .. }));
}

#[test]
fn unknown_scoring_method_is_rejected_by_schema() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = minimal_measure("m1", "1.0.0");
    doc["scales"][0]["method"] = serde_json::json!("median");
    write_measure(dir.path(), "m1", "1-0-0", &doc);

    let err = MeasureRegistry::load(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::SchemaViolation { .. }));
}

#[test]
fn band_gap_fails_the_semantic_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = minimal_measure("m1", "1.0.0");
    // Bands 0-0 and 1-1 jointly cover 0-1; widen the scale to open a gap.
    doc["scales"][0]["max"] = serde_json::json!(5);
    write_measure(dir.path(), "m1", "1-0-0", &doc);

    let err = MeasureRegistry::load(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidSpec { .. }));
}

#[test]
fn scale_referencing_unknown_item_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = minimal_measure("m1", "1.0.0");
    doc["scales"][0]["items"] = serde_json::json!(["m1_item1", "m1_item99"]);
    write_measure(dir.path(), "m1", "1-0-0", &doc);

    let err = MeasureRegistry::load(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidSpec { .. }));
}

#[test]
fn response_value_outside_item_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = minimal_measure("m1", "1.0.0");
    doc["items"][0]["response_map"]["maybe"] = serde_json::json!(4);
    write_measure(dir.path(), "m1", "1-0-0", &doc);

    let err = MeasureRegistry::load(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidSpec { .. }));
}

#[test]
fn equivalent_version_file_names_are_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    write_measure(dir.path(), "m1", "1-0-0", &minimal_measure("m1", "1.0.0"));
    write_measure(dir.path(), "m1", "01-0-0", &minimal_measure("m1", "1.0.0"));

    let err = MeasureRegistry::load(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateSpec { .. }));
}

#[test]
fn version_mismatch_between_document_and_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_measure(dir.path(), "m1", "2-0-0", &minimal_measure("m1", "1.0.0"));

    let err = MeasureRegistry::load(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidSpec { .. }));
}

#[test]
fn non_version_file_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_measure(dir.path(), "m1", "latest", &minimal_measure("m1", "1.0.0"));

    let err = MeasureRegistry::load(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidVersionFile { .. }));
}
