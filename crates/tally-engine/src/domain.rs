//! Domain processor trait and kind-based routing.
//!
//! The set of measurement domains is closed by design: `MeasureKind` is a
//! closed enum, and each kind maps to exactly one registered processor.
//! Domains that exist but are not yet processable are registered as
//! explicit stubs so a misconfigured registry fails loudly instead of
//! silently dropping data.

use std::collections::BTreeMap;

use tally_core::models::{FormSubmission, ProcessingResult};
use tally_registry::spec::{FormBindingSpec, MeasureKind, MeasureSpec};

use crate::domains::questionnaire::QuestionnaireProcessor;
use crate::domains::stubs::{LabProcessor, VitalProcessor, WearableProcessor};
use crate::error::EngineError;

/// Per-run processing switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Fail on incoming fields with no binding instead of skipping them.
    pub strict: bool,
    /// Mint v5 UUIDs and pin the processing clock for reproducible output.
    pub deterministic_ids: bool,
}

/// A domain-specific processor. Implementations handle every measure of
/// their kinds within the submission and return one merged result.
pub trait DomainProcessor: Send + Sync + std::fmt::Debug {
    /// The measure kinds this processor handles.
    fn kinds(&self) -> &[MeasureKind];

    fn process(
        &self,
        submission: &FormSubmission,
        binding: &FormBindingSpec,
        measures: &BTreeMap<String, MeasureSpec>,
        options: &ProcessOptions,
    ) -> Result<ProcessingResult, EngineError>;
}

/// Static kind-to-processor table.
pub struct DomainRouter {
    processors: Vec<Box<dyn DomainProcessor>>,
}

impl DomainRouter {
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// A router with every known domain registered: the questionnaire
    /// processor plus explicit stubs for lab, vital, and wearable.
    pub fn with_default_processors() -> Self {
        let mut router = Self::new();
        router.register(Box::new(QuestionnaireProcessor::new()));
        router.register(Box::new(LabProcessor));
        router.register(Box::new(VitalProcessor));
        router.register(Box::new(WearableProcessor));
        router
    }

    pub fn register(&mut self, processor: Box<dyn DomainProcessor>) {
        self.processors.push(processor);
    }

    pub fn processor_for(&self, kind: MeasureKind) -> Result<&dyn DomainProcessor, EngineError> {
        self.processors
            .iter()
            .find(|p| p.kinds().contains(&kind))
            .map(|p| p.as_ref())
            .ok_or(EngineError::UnknownDomain { kind })
    }

    pub fn supported_kinds(&self) -> Vec<MeasureKind> {
        self.processors
            .iter()
            .flat_map(|p| p.kinds().iter().copied())
            .collect()
    }
}

impl Default for DomainRouter {
    fn default() -> Self {
        Self::new()
    }
}
