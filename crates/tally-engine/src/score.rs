//! The scoring engine.
//!
//! Every rule comes from the measure spec: which items feed each scale,
//! which are reverse scored, the combination method, and how many missing
//! items proration may absorb. Scores are never clamped; out-of-range
//! results are reported as-is with a diagnostic.

use std::collections::BTreeMap;

use tally_core::models::ScoreValue;
use tally_core::models::diagnostics::code;
use tally_registry::spec::{MeasureScale, MeasureSpec, ScoringMethod};

use crate::collector::DiagnosticsCollector;
use crate::recode::RecodedSection;

/// A computed scale score. `value` is `None` when the scale was not
/// scorable.
#[derive(Debug, Clone)]
pub struct ScaleScore {
    pub scale_id: String,
    pub name: String,
    pub method: ScoringMethod,
    pub value: Option<ScoreValue>,
    pub items_used: u32,
    pub items_total: u32,
    pub missing_items: Vec<String>,
    pub prorated: bool,
}

#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    pub measure_id: String,
    pub measure_version: String,
    /// In spec order.
    pub scales: Vec<ScaleScore>,
}

impl ScoringOutcome {
    pub fn scale(&self, scale_id: &str) -> Option<&ScaleScore> {
        self.scales.iter().find(|s| s.scale_id == scale_id)
    }
}

#[derive(Debug)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score every scale of the measure against the recoded values.
    pub fn score(
        &self,
        section: &RecodedSection,
        measure: &MeasureSpec,
        collector: &mut DiagnosticsCollector,
    ) -> ScoringOutcome {
        let values: BTreeMap<&str, i64> = section
            .items
            .iter()
            .filter_map(|i| i.value.map(|v| (i.item_id.as_str(), v)))
            .collect();

        let scales = measure
            .scales
            .iter()
            .map(|scale| self.score_scale(scale, &values, measure, collector))
            .collect();

        ScoringOutcome {
            measure_id: measure.measure_id.clone(),
            measure_version: measure.version.clone(),
            scales,
        }
    }

    fn score_scale(
        &self,
        scale: &MeasureScale,
        values: &BTreeMap<&str, i64>,
        measure: &MeasureSpec,
        collector: &mut DiagnosticsCollector,
    ) -> ScaleScore {
        let mut present = Vec::with_capacity(scale.items.len());
        let mut missing_items = Vec::new();

        for item_id in &scale.items {
            match values.get(item_id.as_str()) {
                Some(&v) => {
                    // Reverse scoring contributes (max_value - v).
                    let contribution = if scale.reversed_items.contains(item_id) {
                        let max = measure
                            .item(item_id)
                            .map(|i| i.max_value)
                            .expect("scale items exist in the measure; enforced at load");
                        max - v
                    } else {
                        v
                    };
                    present.push(contribution);
                }
                None => missing_items.push(item_id.clone()),
            }
        }

        let n_total = scale.items.len();
        let n_present = present.len();
        let n_missing = missing_items.len();

        if n_missing > scale.missing_allowed as usize || n_present == 0 {
            collector.error(
                code::SCALE_NOT_SCORABLE,
                format!(
                    "scale {}: {n_missing} of {n_total} items missing, {} allowed",
                    scale.scale_id, scale.missing_allowed
                ),
                None,
            );
            return ScaleScore {
                scale_id: scale.scale_id.clone(),
                name: scale.name.clone(),
                method: scale.method,
                value: None,
                items_used: n_present as u32,
                items_total: n_total as u32,
                missing_items,
                prorated: false,
            };
        }

        let sum: i64 = present.iter().sum();
        let prorated = n_missing > 0;
        let prorate = |sum: i64| sum as f64 * n_total as f64 / n_present as f64;

        let value = match scale.method {
            ScoringMethod::Sum => {
                if prorated {
                    ScoreValue::Float(prorate(sum))
                } else {
                    ScoreValue::Integer(sum)
                }
            }
            ScoringMethod::Average => ScoreValue::Float(sum as f64 / n_present as f64),
            // Under missing data the sum is prorated first, then doubled.
            ScoringMethod::SumThenDouble => {
                if prorated {
                    ScoreValue::Float(prorate(sum) * 2.0)
                } else {
                    ScoreValue::Integer(sum * 2)
                }
            }
        };

        let score = value.as_f64();
        if score < scale.min as f64 || score > scale.max as f64 {
            collector.warning(
                code::SCALE_OUT_OF_RANGE,
                format!(
                    "scale {}: score {score} outside [{}, {}]",
                    scale.scale_id, scale.min, scale.max
                ),
                None,
            );
        }

        ScaleScore {
            scale_id: scale.scale_id.clone(),
            name: scale.name.clone(),
            method: scale.method,
            value: Some(value),
            items_used: n_present as u32,
            items_total: n_total as u32,
            missing_items,
            prorated,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}
