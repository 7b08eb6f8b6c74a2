//! Interpretation band lookup.
//!
//! Integer-natured scales (sum, sum_then_double) are matched on the
//! half-up-rounded score, so prorated fractional results still land in a
//! band. Average scales are compared directly.

use std::collections::BTreeMap;

use tally_core::models::diagnostics::code;
use tally_registry::spec::{MeasureSpec, ScoringMethod};

use crate::collector::DiagnosticsCollector;
use crate::score::ScoringOutcome;

/// Round halves toward +∞ regardless of sign.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

#[derive(Debug)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Look up the band label for every scored scale. Scales whose score
    /// falls into no band (e.g. prorated into a gap) get no label and a
    /// `NO_INTERPRETATION_BAND` diagnostic.
    pub fn interpret(
        &self,
        outcome: &ScoringOutcome,
        measure: &MeasureSpec,
        collector: &mut DiagnosticsCollector,
    ) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();

        for score in &outcome.scales {
            let Some(value) = score.value else { continue };
            let Some(scale) = measure.scale(&score.scale_id) else {
                continue;
            };

            let key = match scale.method {
                ScoringMethod::Average => value.as_f64(),
                ScoringMethod::Sum | ScoringMethod::SumThenDouble => {
                    round_half_up(value.as_f64())
                }
            };

            let band = scale
                .interpretations
                .iter()
                .find(|b| b.min as f64 <= key && key <= b.max as f64);

            match band {
                Some(band) => {
                    labels.insert(score.scale_id.clone(), band.label.clone());
                }
                None => collector.warning(
                    code::NO_INTERPRETATION_BAND,
                    format!(
                        "scale {}: score {} matches no interpretation band",
                        score.scale_id,
                        value.as_f64()
                    ),
                    None,
                ),
            }
        }

        labels
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
