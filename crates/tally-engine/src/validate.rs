//! Per-submission validation ahead of scoring: completeness per scale,
//! value ranges, and items that no scale references.

use std::collections::BTreeSet;

use tally_core::models::diagnostics::code;
use tally_registry::spec::{MeasureSpec, ScoringMethod};

use crate::collector::DiagnosticsCollector;
use crate::recode::RecodedSection;

#[derive(Debug)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        section: &RecodedSection,
        measure: &MeasureSpec,
        collector: &mut DiagnosticsCollector,
    ) {
        let present: BTreeSet<&str> = section
            .items
            .iter()
            .filter(|i| !i.missing)
            .map(|i| i.item_id.as_str())
            .collect();

        // Range re-check of recoded values against the item definition.
        for item in section.items.iter().filter(|i| !i.missing) {
            let Some(value) = item.value else { continue };
            let Some(spec_item) = measure.item(&item.item_id) else {
                continue;
            };
            if value < spec_item.min_value || value > spec_item.max_value {
                collector.warning(
                    code::VALUE_OUT_OF_RANGE,
                    format!(
                        "value {value} outside [{}, {}]",
                        spec_item.min_value, spec_item.max_value
                    ),
                    Some(&item.item_id),
                );
            }
        }

        for scale in &measure.scales {
            let n_total = scale.items.len();
            let n_present = scale
                .items
                .iter()
                .filter(|id| present.contains(id.as_str()))
                .count();
            let n_missing = n_total - n_present;
            if n_missing == 0 {
                continue;
            }

            let mut detail = format!(
                "scale {}: {n_present} of {n_total} items present",
                scale.scale_id
            );
            // Surface the proration rule that scoring will apply, for audit.
            if n_missing <= scale.missing_allowed as usize {
                detail.push_str(match scale.method {
                    ScoringMethod::Sum => "; score will be prorated (sum scaled by total/present)",
                    ScoringMethod::SumThenDouble => {
                        "; score will be prorated (sum scaled by total/present, then doubled)"
                    }
                    ScoringMethod::Average => "; average will use present items only",
                });
            }
            collector.warning(code::SCALE_INCOMPLETE, detail, None);
        }

        // Items answered but referenced by no scale. Informational.
        let in_any_scale: BTreeSet<&str> = measure
            .scales
            .iter()
            .flat_map(|s| s.items.iter())
            .map(String::as_str)
            .collect();
        for item_id in present.difference(&in_any_scale) {
            collector.warning(
                code::UNKNOWN_ITEM,
                "item is not referenced by any scale",
                Some(*item_id),
            );
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
