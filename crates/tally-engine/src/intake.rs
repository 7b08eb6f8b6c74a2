//! High-level intake for canonical form submissions.
//!
//! The item-map variant of binding resolution: instead of a pre-registered
//! binding spec, the `(form_id, measure_id)` pair selects a flat
//! `field_id -> item_id` map from the store, which is lowered into a
//! one-section binding and processed normally.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tally_core::models::{FormSubmission, ProcessingResult};
use tally_registry::spec::{BindingKey, BindingSection, FormBindingSpec, ItemBinding};
use tally_registry::{ItemMapStore, MeasureRegistry};

use crate::domain::{DomainRouter, ProcessOptions};
use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct IntakeOptions {
    /// `None` selects the latest measure version.
    pub measure_version: Option<String>,
    /// Overrides the submission's own form_id.
    pub form_id: Option<String>,
    /// Bypasses the store entirely.
    pub item_map_override: Option<BTreeMap<String, String>>,
    pub strict: bool,
    pub deterministic_ids: bool,
}

impl Default for IntakeOptions {
    fn default() -> Self {
        Self {
            measure_version: None,
            form_id: None,
            item_map_override: None,
            strict: true,
            deterministic_ids: false,
        }
    }
}

/// Process a canonical form submission for a single measure.
///
/// Fatal configuration paths: `MissingFormId` when no form id can be
/// determined, `MissingItemMap` when the store has no map for the pair and
/// no override was given, and `UnmappedFields` in strict mode. Semantic
/// issues land in the result's diagnostics instead.
pub fn process_form_submission(
    submission: &FormSubmission,
    measure_id: &str,
    store: &ItemMapStore,
    measures: &MeasureRegistry,
    options: &IntakeOptions,
) -> Result<ProcessingResult, EngineError> {
    let form_id = options
        .form_id
        .clone()
        .or_else(|| (!submission.form_id.is_empty()).then(|| submission.form_id.clone()))
        .ok_or(EngineError::MissingFormId)?;

    let item_map = match &options.item_map_override {
        Some(map) => map.clone(),
        None => {
            store
                .item_map(&form_id, measure_id)?
                .ok_or_else(|| EngineError::MissingItemMap {
                    form_id: form_id.clone(),
                    measure_id: measure_id.to_string(),
                })?
        }
    };

    let measure = measures.get(measure_id, options.measure_version.as_deref())?;

    // Lower the flat map into a one-section binding, all by field_key.
    let binding = FormBindingSpec {
        binding_id: format!("_auto_{form_id}_{measure_id}"),
        version: "1.0.0".to_string(),
        form_id: form_id.clone(),
        description: None,
        sections: vec![BindingSection {
            measure_id: measure_id.to_string(),
            measure_version: measure.version.clone(),
            bindings: item_map
                .iter()
                .map(|(field_id, item_id)| ItemBinding {
                    item_id: item_id.clone(),
                    by: BindingKey::FieldKey,
                    value: field_id.clone(),
                })
                .collect(),
        }],
    };

    let submission = if submission.form_id == form_id {
        Cow::Borrowed(submission)
    } else {
        let mut adjusted = submission.clone();
        adjusted.form_id = form_id;
        Cow::Owned(adjusted)
    };

    let mut measure_map = BTreeMap::new();
    measure_map.insert(measure_id.to_string(), measure.clone());

    let router = DomainRouter::with_default_processors();
    let processor = router.processor_for(measure.kind)?;
    let process_options = ProcessOptions {
        strict: options.strict,
        deterministic_ids: options.deterministic_ids,
    };

    processor.process(&submission, &binding, &measure_map, &process_options)
}
