//! Measure and binding specifications.
//!
//! All measure semantics live here as data: items with response maps,
//! scales with scoring methods, and interpretation bands. The scoring
//! engine reads these; nothing in the system carries per-measure code.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Measurement domain a measure belongs to. Closed set: unknown kinds are
/// rejected at deserialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureKind {
    Questionnaire,
    Lab,
    Vital,
    Wearable,
}

/// How a scale combines its item values. Unknown methods fail spec load,
/// not scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    Sum,
    Average,
    SumThenDouble,
}

/// A contiguous score range mapped to a severity label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretationBand {
    pub min: i64,
    pub max: i64,
    pub label: String,
    pub severity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single question with a fixed response map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureItem {
    pub item_id: String,
    /// 1-based ordinal; observation order follows it.
    pub position: u32,
    pub text: String,
    /// Normalized answer text -> integer score.
    pub response_map: BTreeMap<String, i64>,
    pub min_value: i64,
    pub max_value: i64,
}

/// A scored subset of items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureScale {
    pub scale_id: String,
    pub name: String,
    pub items: Vec<String>,
    pub method: ScoringMethod,
    #[serde(default)]
    pub reversed_items: Vec<String>,
    pub min: i64,
    pub max: i64,
    /// Maximum missing items for which proration is permitted.
    #[serde(default)]
    pub missing_allowed: u32,
    pub interpretations: Vec<InterpretationBand>,
}

/// A complete, versioned measure specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureSpec {
    pub measure_id: String,
    pub version: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: MeasureKind,
    pub items: Vec<MeasureItem>,
    pub scales: Vec<MeasureScale>,
}

impl MeasureSpec {
    pub fn item(&self, item_id: &str) -> Option<&MeasureItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn scale(&self, scale_id: &str) -> Option<&MeasureScale> {
        self.scales.iter().find(|s| s.scale_id == scale_id)
    }

    /// Check the semantic invariants the schema cannot express. Returns all
    /// violations; an empty vec means the spec is sound.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let mut item_ids = BTreeSet::new();
        let mut positions = BTreeSet::new();
        for item in &self.items {
            if !item_ids.insert(item.item_id.as_str()) {
                problems.push(format!("duplicate item_id: {}", item.item_id));
            }
            if !positions.insert(item.position) {
                problems.push(format!(
                    "duplicate position {} on item {}",
                    item.position, item.item_id
                ));
            }
            if item.min_value > item.max_value {
                problems.push(format!(
                    "item {}: min_value {} exceeds max_value {}",
                    item.item_id, item.min_value, item.max_value
                ));
            }
            for (text, value) in &item.response_map {
                if *value < item.min_value || *value > item.max_value {
                    problems.push(format!(
                        "item {}: response '{}' maps to {} outside [{}, {}]",
                        item.item_id, text, value, item.min_value, item.max_value
                    ));
                }
            }
        }

        let mut scale_ids = BTreeSet::new();
        for scale in &self.scales {
            if !scale_ids.insert(scale.scale_id.as_str()) {
                problems.push(format!("duplicate scale_id: {}", scale.scale_id));
            }
            for item_id in &scale.items {
                if !item_ids.contains(item_id.as_str()) {
                    problems.push(format!(
                        "scale {} references unknown item: {item_id}",
                        scale.scale_id
                    ));
                }
            }
            for item_id in &scale.reversed_items {
                if !scale.items.contains(item_id) {
                    problems.push(format!(
                        "scale {}: reversed item {item_id} is not part of the scale",
                        scale.scale_id
                    ));
                }
            }
            if scale.min > scale.max {
                problems.push(format!(
                    "scale {}: min {} exceeds max {}",
                    scale.scale_id, scale.min, scale.max
                ));
            }
            problems.extend(check_band_coverage(scale));
        }

        problems
    }
}

/// Bands must be non-overlapping and jointly cover [scale.min, scale.max].
fn check_band_coverage(scale: &MeasureScale) -> Vec<String> {
    let mut problems = Vec::new();

    let mut bands: Vec<&InterpretationBand> = scale.interpretations.iter().collect();
    if bands.is_empty() {
        problems.push(format!("scale {}: no interpretation bands", scale.scale_id));
        return problems;
    }
    bands.sort_by_key(|b| b.min);

    for band in &bands {
        if band.min > band.max {
            problems.push(format!(
                "scale {}: band '{}' has min {} above max {}",
                scale.scale_id, band.label, band.min, band.max
            ));
        }
    }

    if bands[0].min != scale.min {
        problems.push(format!(
            "scale {}: bands start at {} but scale min is {}",
            scale.scale_id, bands[0].min, scale.min
        ));
    }
    for pair in bands.windows(2) {
        if pair[1].min != pair[0].max + 1 {
            problems.push(format!(
                "scale {}: gap or overlap between bands '{}' and '{}'",
                scale.scale_id, pair[0].label, pair[1].label
            ));
        }
    }
    if bands[bands.len() - 1].max != scale.max {
        problems.push(format!(
            "scale {}: bands end at {} but scale max is {}",
            scale.scale_id,
            bands[bands.len() - 1].max,
            scale.max
        ));
    }

    problems
}

/// How to locate one incoming field for a canonical item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKey {
    FieldKey,
    QuestionText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemBinding {
    pub item_id: String,
    pub by: BindingKey,
    pub value: String,
}

/// Bindings for one target measure within a form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingSection {
    pub measure_id: String,
    pub measure_version: String,
    pub bindings: Vec<ItemBinding>,
}

/// A complete, versioned form-to-measure binding specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormBindingSpec {
    pub binding_id: String,
    pub version: String,
    pub form_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sections: Vec<BindingSection>,
}

impl FormBindingSpec {
    pub fn section_for_measure(&self, measure_id: &str) -> Option<&BindingSection> {
        self.sections.iter().find(|s| s.measure_id == measure_id)
    }
}
