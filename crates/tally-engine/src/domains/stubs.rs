//! Explicit stubs for domains that are registered but not yet processable.
//!
//! Routing a measure to one of these fails with `NotImplemented` rather
//! than the kind being absent from the table; configuration mistakes
//! surface loudly.

use std::collections::BTreeMap;

use tally_core::models::{FormSubmission, ProcessingResult};
use tally_registry::spec::{FormBindingSpec, MeasureKind, MeasureSpec};

use crate::domain::{DomainProcessor, ProcessOptions};
use crate::error::EngineError;

#[derive(Debug)]
pub struct LabProcessor;

impl DomainProcessor for LabProcessor {
    fn kinds(&self) -> &[MeasureKind] {
        &[MeasureKind::Lab]
    }

    fn process(
        &self,
        _submission: &FormSubmission,
        _binding: &FormBindingSpec,
        _measures: &BTreeMap<String, MeasureSpec>,
        _options: &ProcessOptions,
    ) -> Result<ProcessingResult, EngineError> {
        Err(EngineError::NotImplemented {
            kind: MeasureKind::Lab,
        })
    }
}

#[derive(Debug)]
pub struct VitalProcessor;

impl DomainProcessor for VitalProcessor {
    fn kinds(&self) -> &[MeasureKind] {
        &[MeasureKind::Vital]
    }

    fn process(
        &self,
        _submission: &FormSubmission,
        _binding: &FormBindingSpec,
        _measures: &BTreeMap<String, MeasureSpec>,
        _options: &ProcessOptions,
    ) -> Result<ProcessingResult, EngineError> {
        Err(EngineError::NotImplemented {
            kind: MeasureKind::Vital,
        })
    }
}

#[derive(Debug)]
pub struct WearableProcessor;

impl DomainProcessor for WearableProcessor {
    fn kinds(&self) -> &[MeasureKind] {
        &[MeasureKind::Wearable]
    }

    fn process(
        &self,
        _submission: &FormSubmission,
        _binding: &FormBindingSpec,
        _measures: &BTreeMap<String, MeasureSpec>,
        _options: &ProcessOptions,
    ) -> Result<ProcessingResult, EngineError> {
        Err(EngineError::NotImplemented {
            kind: MeasureKind::Wearable,
        })
    }
}
