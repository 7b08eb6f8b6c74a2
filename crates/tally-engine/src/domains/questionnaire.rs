//! Questionnaire domain processor.
//!
//! Drives one submission through the full stage sequence for every
//! questionnaire measure the binding targets: resolve, recode, validate,
//! score, interpret, build.

use std::collections::BTreeMap;

use tally_core::models::diagnostics::code;
use tally_core::models::{
    DiagnosticSummary, Diagnostics, FormSubmission, MeasurementEvent, ProcessingResult,
};
use tally_registry::spec::{BindingSection, FormBindingSpec, MeasureKind, MeasureSpec};

use crate::builder::{EventBuilder, EventContext};
use crate::collector::DiagnosticsCollector;
use crate::domain::{DomainProcessor, ProcessOptions};
use crate::error::EngineError;
use crate::interpret::Interpreter;
use crate::recode::Recoder;
use crate::resolve::{Resolver, SectionResolution};
use crate::score::ScoringEngine;
use crate::validate::Validator;

const PROCESSOR: &str = "questionnaire";

#[derive(Debug)]
pub struct QuestionnaireProcessor {
    resolver: Resolver,
    recoder: Recoder,
    validator: Validator,
    engine: ScoringEngine,
    interpreter: Interpreter,
}

impl QuestionnaireProcessor {
    pub fn new() -> Self {
        Self {
            resolver: Resolver::new(),
            recoder: Recoder::new(),
            validator: Validator::new(),
            engine: ScoringEngine::new(),
            interpreter: Interpreter::new(),
        }
    }

    fn process_section(
        &self,
        submission: &FormSubmission,
        binding: &FormBindingSpec,
        section: &SectionResolution,
        unmapped_fields: &[String],
        measure: &MeasureSpec,
        builder: &EventBuilder,
    ) -> (MeasurementEvent, Diagnostics) {
        let mut collector =
            DiagnosticsCollector::new(&submission.submission_id, &section.measure_id);

        // Diagnostics records are per measure: only duplicates touching
        // this section's own bindings belong here.
        for field_id in &section.duplicate_fields {
            collector.warning(
                code::DUPLICATE_FIELD,
                format!("field '{field_id}' appears more than once; first occurrence kept"),
                None,
            );
        }
        for field_id in unmapped_fields {
            collector.warning(
                code::UNMAPPED_FIELD_SKIPPED,
                format!("field '{field_id}' has no binding and was dropped"),
                None,
            );
        }
        for item_id in &section.missing_bindings {
            collector.warning(
                code::MISSING_BINDING,
                "binding matched no incoming field; item treated as missing",
                Some(item_id),
            );
        }

        let recoded = self.recoder.recode(section, measure, &mut collector);
        self.validator.validate(&recoded, measure, &mut collector);
        let outcome = self.engine.score(&recoded, measure, &mut collector);
        let labels = self.interpreter.interpret(&outcome, measure, &mut collector);

        let ctx = EventContext {
            form_id: &submission.form_id,
            submission_id: &submission.submission_id,
            subject_id: submission.subject().unwrap_or("unknown"),
            timestamp: &submission.timestamp,
            binding_id: &binding.binding_id,
            binding_version: &binding.version,
            processor: PROCESSOR,
        };
        let event = builder.build(&ctx, &recoded, &outcome, &labels);

        let items_present = recoded.items.iter().filter(|i| !i.missing).count() as u32;
        let scales_scored = outcome.scales.iter().filter(|s| s.value.is_some()).count() as u32;
        let summary = DiagnosticSummary {
            items_present,
            items_missing: recoded.items.len() as u32 - items_present,
            scales_scored,
            scales_not_scorable: outcome.scales.len() as u32 - scales_scored,
        };

        (event, collector.finish(summary))
    }
}

impl DomainProcessor for QuestionnaireProcessor {
    fn kinds(&self) -> &[MeasureKind] {
        &[MeasureKind::Questionnaire]
    }

    fn process(
        &self,
        submission: &FormSubmission,
        binding: &FormBindingSpec,
        measures: &BTreeMap<String, MeasureSpec>,
        options: &ProcessOptions,
    ) -> Result<ProcessingResult, EngineError> {
        // Only the sections whose measure belongs to this domain.
        let sections: Vec<&BindingSection> = binding
            .sections
            .iter()
            .filter(|s| {
                measures
                    .get(&s.measure_id)
                    .is_some_and(|m| self.kinds().contains(&m.kind))
            })
            .collect();

        let resolution = self
            .resolver
            .resolve(&submission.items, &sections, options.strict)?;

        let builder = EventBuilder::new(options.deterministic_ids);
        let mut events = Vec::with_capacity(resolution.sections.len());
        let mut diagnostics = Vec::with_capacity(resolution.sections.len());

        for (index, section) in resolution.sections.iter().enumerate() {
            let measure = measures
                .get(&section.measure_id)
                .expect("resolved sections were filtered to known measures");
            // Unmapped fields belong to the submission as a whole, not to
            // any one measure; record them once, on the first record.
            let unmapped_fields: &[String] = if index == 0 {
                &resolution.unmapped_fields
            } else {
                &[]
            };
            let (event, diag) = self.process_section(
                submission,
                binding,
                section,
                unmapped_fields,
                measure,
                &builder,
            );
            events.push(event);
            diagnostics.push(diag);
        }

        let success = diagnostics.iter().all(|d| d.is_success());
        Ok(ProcessingResult {
            form_submission_id: submission.submission_id.clone(),
            success,
            events,
            diagnostics,
        })
    }
}

impl Default for QuestionnaireProcessor {
    fn default() -> Self {
        Self::new()
    }
}
