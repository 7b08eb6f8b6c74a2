//! Field-to-item resolution.
//!
//! Purely mechanical: an item is located by its declared binding
//! (`field_key` or normalized `question_text`) or not at all. No fuzzy
//! matching, no inference from form contents.

use std::collections::{BTreeMap, BTreeSet};

use tally_core::models::{RawValue, SubmissionItem};
use tally_registry::spec::{BindingKey, BindingSection};

use crate::error::EngineError;
use crate::recode::normalize_answer;

/// One submission answer located for a canonical item.
#[derive(Debug, Clone)]
pub struct ResolvedAnswer {
    pub field_id: String,
    pub raw_value: Option<RawValue>,
}

/// Resolution of one binding section.
#[derive(Debug, Clone)]
pub struct SectionResolution {
    pub measure_id: String,
    pub measure_version: String,
    pub answers: BTreeMap<String, ResolvedAnswer>,
    /// Items whose binding matched no incoming field; they are treated as
    /// missing downstream.
    pub missing_bindings: Vec<String>,
    /// Duplicated incoming field_ids that this section's own bindings
    /// reference. Diagnostics records are per measure, so duplicates are
    /// attributed only to the sections they touch.
    pub duplicate_fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub sections: Vec<SectionResolution>,
    /// Incoming field_ids that appeared more than once; first occurrence
    /// wins.
    pub duplicate_fields: Vec<String>,
    /// Incoming field_ids consumed by no binding of any section.
    pub unmapped_fields: Vec<String>,
}

#[derive(Debug)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve every section's bindings against the submission items.
    ///
    /// In strict mode any incoming field left unconsumed is a fatal
    /// `UnmappedFields` error; otherwise such fields are reported on the
    /// outcome and dropped.
    pub fn resolve(
        &self,
        items: &[SubmissionItem],
        sections: &[&BindingSection],
        strict: bool,
    ) -> Result<ResolutionOutcome, EngineError> {
        let mut by_field: BTreeMap<&str, &SubmissionItem> = BTreeMap::new();
        let mut by_question: BTreeMap<String, &SubmissionItem> = BTreeMap::new();
        let mut duplicate_fields = Vec::new();

        for item in items {
            if by_field.contains_key(item.field_id.as_str()) {
                duplicate_fields.push(item.field_id.clone());
                continue;
            }
            by_field.insert(&item.field_id, item);
            if let Some(text) = &item.question_text {
                // First match wins on question-text ties as well.
                by_question.entry(normalize_answer(text)).or_insert(item);
            }
        }

        let duplicate_set: BTreeSet<&str> =
            duplicate_fields.iter().map(String::as_str).collect();

        let mut used: BTreeSet<&str> = BTreeSet::new();
        let mut resolved_sections = Vec::with_capacity(sections.len());

        for section in sections {
            let mut answers = BTreeMap::new();
            let mut missing_bindings = Vec::new();
            let mut section_duplicates: BTreeSet<&str> = BTreeSet::new();

            for binding in &section.bindings {
                let found = match binding.by {
                    BindingKey::FieldKey => by_field.get(binding.value.as_str()).copied(),
                    BindingKey::QuestionText => {
                        by_question.get(&normalize_answer(&binding.value)).copied()
                    }
                };

                if binding.by == BindingKey::FieldKey
                    && duplicate_set.contains(binding.value.as_str())
                {
                    section_duplicates.insert(binding.value.as_str());
                }

                match found {
                    Some(item) => {
                        used.insert(item.field_id.as_str());
                        if duplicate_set.contains(item.field_id.as_str()) {
                            section_duplicates.insert(item.field_id.as_str());
                        }
                        answers.insert(
                            binding.item_id.clone(),
                            ResolvedAnswer {
                                field_id: item.field_id.clone(),
                                raw_value: item.raw_value.clone(),
                            },
                        );
                    }
                    None => missing_bindings.push(binding.item_id.clone()),
                }
            }

            resolved_sections.push(SectionResolution {
                measure_id: section.measure_id.clone(),
                measure_version: section.measure_version.clone(),
                answers,
                missing_bindings,
                duplicate_fields: section_duplicates
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            });
        }

        let mut unmapped_fields = Vec::new();
        for field in by_field.keys() {
            if !used.contains(*field) {
                unmapped_fields.push((*field).to_string());
            }
        }

        if strict && !unmapped_fields.is_empty() {
            return Err(EngineError::UnmappedFields {
                fields: unmapped_fields,
            });
        }

        Ok(ResolutionOutcome {
            sections: resolved_sections,
            duplicate_fields,
            unmapped_fields,
        })
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
