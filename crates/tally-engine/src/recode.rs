//! Answer recoding: raw text (or numbers) to the integers defined by each
//! item's response map.
//!
//! The recoder is strict. Text must match the response map exactly after
//! normalization, or parse as an in-range integer; anything else makes the
//! item missing with an `UNRECOGNIZED_VALUE` diagnostic. Null and empty
//! answers are missing without diagnostic.

use tally_core::models::RawValue;
use tally_core::models::diagnostics::code;
use tally_registry::spec::{MeasureItem, MeasureSpec};

use crate::collector::DiagnosticsCollector;
use crate::resolve::SectionResolution;

/// Lower-case, trim, and collapse internal whitespace.
pub fn normalize_answer(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One measure item after recoding. Exactly one exists per item of the
/// measure, whether or not the submission answered it.
#[derive(Debug, Clone)]
pub struct RecodedItem {
    pub item_id: String,
    pub position: u32,
    pub value: Option<i64>,
    pub raw_answer: Option<String>,
    pub missing: bool,
}

#[derive(Debug, Clone)]
pub struct RecodedSection {
    pub measure_id: String,
    pub measure_version: String,
    /// In item position order.
    pub items: Vec<RecodedItem>,
}

#[derive(Debug)]
pub struct Recoder;

impl Recoder {
    pub fn new() -> Self {
        Self
    }

    /// Recode every item of the measure, in position order.
    pub fn recode(
        &self,
        resolution: &SectionResolution,
        measure: &MeasureSpec,
        collector: &mut DiagnosticsCollector,
    ) -> RecodedSection {
        let mut spec_items: Vec<&MeasureItem> = measure.items.iter().collect();
        spec_items.sort_by_key(|i| i.position);

        let mut items = Vec::with_capacity(spec_items.len());
        for spec_item in spec_items {
            items.push(self.recode_item(spec_item, resolution, collector));
        }

        RecodedSection {
            measure_id: measure.measure_id.clone(),
            measure_version: measure.version.clone(),
            items,
        }
    }

    fn recode_item(
        &self,
        spec_item: &MeasureItem,
        resolution: &SectionResolution,
        collector: &mut DiagnosticsCollector,
    ) -> RecodedItem {
        let answer = resolution.answers.get(&spec_item.item_id);

        let (value, raw_answer) = match answer.and_then(|a| a.raw_value.as_ref()) {
            // Unresolved or null answers are missing; the resolver already
            // diagnosed unresolved bindings.
            None => (None, None),
            Some(raw) => {
                let display = raw.display();
                match self.recode_value(raw, spec_item) {
                    Ok(Some(v)) => (Some(v), Some(display)),
                    Ok(None) => (None, Some(display)),
                    Err((diag_code, detail)) => {
                        collector.warning(diag_code, detail, Some(&spec_item.item_id));
                        (None, Some(display))
                    }
                }
            }
        };

        RecodedItem {
            item_id: spec_item.item_id.clone(),
            position: spec_item.position,
            missing: value.is_none(),
            value,
            raw_answer,
        }
    }

    /// `Ok(None)` is an empty answer: missing, no diagnostic.
    fn recode_value(
        &self,
        raw: &RawValue,
        item: &MeasureItem,
    ) -> Result<Option<i64>, (&'static str, String)> {
        match raw {
            RawValue::Text(text) => {
                let normalized = normalize_answer(text);
                if normalized.is_empty() {
                    return Ok(None);
                }

                if let Some((_, value)) = item
                    .response_map
                    .iter()
                    .find(|(k, _)| normalize_answer(k) == normalized)
                {
                    return Ok(Some(*value));
                }

                if let Ok(parsed) = normalized.parse::<i64>()
                    && parsed >= item.min_value
                    && parsed <= item.max_value
                {
                    return Ok(Some(parsed));
                }

                Err((
                    code::UNRECOGNIZED_VALUE,
                    format!(
                        "answer '{text}' is not a known response and is not an integer in [{}, {}]",
                        item.min_value, item.max_value
                    ),
                ))
            }
            RawValue::Integer(n) => self.check_range(*n, item),
            RawValue::Number(x) => {
                if x.fract() == 0.0 {
                    self.check_range(*x as i64, item)
                } else {
                    Err((
                        code::UNRECOGNIZED_VALUE,
                        format!("answer {x} is not an integer value"),
                    ))
                }
            }
        }
    }

    fn check_range(
        &self,
        value: i64,
        item: &MeasureItem,
    ) -> Result<Option<i64>, (&'static str, String)> {
        if value >= item.min_value && value <= item.max_value {
            Ok(Some(value))
        } else {
            Err((
                code::VALUE_OUT_OF_RANGE,
                format!(
                    "value {value} outside [{}, {}]",
                    item.min_value, item.max_value
                ),
            ))
        }
    }
}

impl Default for Recoder {
    fn default() -> Self {
        Self::new()
    }
}
