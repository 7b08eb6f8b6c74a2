//! The per-submission facade: load specs once, then route each submission
//! to its domain processor.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tally_core::models::{FormSubmission, ProcessingResult};
use tally_registry::spec::{FormBindingSpec, MeasureKind, MeasureSpec};
use tally_registry::{BindingRegistry, MeasureRegistry};

use crate::domain::{DomainRouter, ProcessOptions};
use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub measure_registry: PathBuf,
    pub binding_registry: PathBuf,
    pub binding_id: String,
    /// `None` selects the latest binding version.
    pub binding_version: Option<String>,
    pub options: ProcessOptions,
}

/// Immutable after construction: registries are read once and the binding
/// plus its measures are resolved up front. Submissions are independent
/// pure computations thereafter.
pub struct Pipeline {
    binding: FormBindingSpec,
    measures: BTreeMap<String, MeasureSpec>,
    router: DomainRouter,
    options: ProcessOptions,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self, EngineError> {
        let measure_registry = MeasureRegistry::load(&config.measure_registry)?;
        let binding_registry = BindingRegistry::load(&config.binding_registry)?;

        let binding = binding_registry
            .get(&config.binding_id, config.binding_version.as_deref())?
            .clone();

        // Sections pin measure versions.
        let mut measures = BTreeMap::new();
        for section in &binding.sections {
            let spec = measure_registry.get(&section.measure_id, Some(&section.measure_version))?;
            measures.insert(section.measure_id.clone(), spec.clone());
        }

        tracing::info!(
            binding_id = %binding.binding_id,
            binding_version = %binding.version,
            measures = measures.len(),
            "pipeline ready"
        );

        Ok(Self {
            binding,
            measures,
            router: DomainRouter::with_default_processors(),
            options: config.options,
        })
    }

    pub fn binding(&self) -> &FormBindingSpec {
        &self.binding
    }

    pub fn measures(&self) -> impl Iterator<Item = &MeasureSpec> {
        self.measures.values()
    }

    /// Process one submission, routing each targeted measure to its
    /// domain processor and merging the per-domain results.
    pub fn process(&self, submission: &FormSubmission) -> Result<ProcessingResult, EngineError> {
        let mut kinds: Vec<MeasureKind> = Vec::new();
        for section in &self.binding.sections {
            if let Some(measure) = self.measures.get(&section.measure_id)
                && !kinds.contains(&measure.kind)
            {
                kinds.push(measure.kind);
            }
        }

        let mut merged: Option<ProcessingResult> = None;
        for kind in kinds {
            let processor = self.router.processor_for(kind)?;
            let result =
                processor.process(submission, &self.binding, &self.measures, &self.options)?;
            merged = Some(match merged {
                Some(acc) => acc.merge(result),
                None => result,
            });
        }

        Ok(merged.unwrap_or_else(|| ProcessingResult {
            form_submission_id: submission.submission_id.clone(),
            success: true,
            events: Vec::new(),
            diagnostics: Vec::new(),
        }))
    }

    /// Process a batch. Submissions are independent; a configuration error
    /// on one record does not abort the others.
    pub fn process_batch(
        &self,
        submissions: &[FormSubmission],
    ) -> Vec<Result<ProcessingResult, EngineError>> {
        submissions.iter().map(|s| self.process(s)).collect()
    }
}
