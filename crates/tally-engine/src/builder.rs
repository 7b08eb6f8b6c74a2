//! Measurement event assembly.
//!
//! One event per (submission, measure). Observations are emitted in a
//! stable order: items by position, then scales in spec order.

use std::collections::BTreeMap;

use tally_core::ids::IdGen;
use tally_core::models::event::{MEASUREMENT_EVENT_SCHEMA, OBSERVATION_SCHEMA};
use tally_core::models::{
    MeasurementEvent, Observation, ObservationKind, ScoreValue, Source, Telemetry, ValueType,
};

use crate::recode::RecodedSection;
use crate::score::ScoringOutcome;

/// Submission- and binding-level context an event is built under.
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    pub form_id: &'a str,
    pub submission_id: &'a str,
    pub subject_id: &'a str,
    pub timestamp: &'a str,
    pub binding_id: &'a str,
    pub binding_version: &'a str,
    pub processor: &'a str,
}

pub struct EventBuilder {
    ids: IdGen,
}

impl EventBuilder {
    pub fn new(deterministic_ids: bool) -> Self {
        Self {
            ids: IdGen::new(deterministic_ids),
        }
    }

    pub fn build(
        &self,
        ctx: &EventContext<'_>,
        section: &RecodedSection,
        outcome: &ScoringOutcome,
        labels: &BTreeMap<String, String>,
    ) -> MeasurementEvent {
        let mut observations = Vec::with_capacity(section.items.len() + outcome.scales.len());

        for item in &section.items {
            observations.push(Observation {
                schema: OBSERVATION_SCHEMA.to_string(),
                observation_id: self.ids.observation_id(
                    &section.measure_id,
                    ctx.submission_id,
                    &item.item_id,
                ),
                measure_id: section.measure_id.clone(),
                code: item.item_id.clone(),
                kind: ObservationKind::Item,
                value: item.value.map(ScoreValue::Integer),
                value_type: item
                    .value
                    .map_or(ValueType::Null, |_| ValueType::Integer),
                raw_answer: item.raw_answer.clone(),
                label: None,
                position: Some(item.position),
                missing: item.missing,
            });
        }

        for scale in &outcome.scales {
            observations.push(Observation {
                schema: OBSERVATION_SCHEMA.to_string(),
                observation_id: self.ids.observation_id(
                    &section.measure_id,
                    ctx.submission_id,
                    &scale.scale_id,
                ),
                measure_id: section.measure_id.clone(),
                code: scale.scale_id.clone(),
                kind: ObservationKind::Scale,
                value: scale.value,
                value_type: scale.value.map_or(ValueType::Null, |v| v.value_type()),
                raw_answer: None,
                label: labels.get(&scale.scale_id).cloned(),
                position: None,
                missing: scale.value.is_none(),
            });
        }

        // Deterministic runs pin the processing clock to the submission
        // timestamp so outputs are byte-identical.
        let processed_at = if self.ids.is_deterministic() {
            ctx.timestamp.to_string()
        } else {
            jiff::Timestamp::now().to_string()
        };

        MeasurementEvent {
            schema: MEASUREMENT_EVENT_SCHEMA.to_string(),
            measurement_event_id: self.ids.event_id(&section.measure_id, ctx.submission_id),
            measure_id: section.measure_id.clone(),
            measure_version: section.measure_version.clone(),
            subject_id: ctx.subject_id.to_string(),
            timestamp: ctx.timestamp.to_string(),
            source: Source {
                form_id: ctx.form_id.to_string(),
                platform: Source::platform_of(ctx.form_id),
                submission_id: ctx.submission_id.to_string(),
                binding_id: ctx.binding_id.to_string(),
                binding_version: ctx.binding_version.to_string(),
            },
            observations,
            telemetry: Telemetry {
                processor: ctx.processor.to_string(),
                processor_version: env!("CARGO_PKG_VERSION").to_string(),
                processed_at,
                items_observed: section.items.len() as u32,
                scales_observed: outcome.scales.len() as u32,
            },
        }
    }
}
