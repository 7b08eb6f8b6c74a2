//! JSON Schema validation for spec documents.
//!
//! Both schemas are embedded; an external schema file can be supplied to
//! override them (the CLI's `validate` command exposes this). Documents are
//! checked against the schema before being deserialized into typed specs.

use std::path::Path;

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::error::RegistryError;

pub struct SpecSchema {
    compiled: JSONSchema,
}

impl SpecSchema {
    /// The embedded schema for measure specs.
    pub fn measure_spec() -> Self {
        Self::compile(&measure_spec_schema()).expect("embedded measure_spec schema compiles")
    }

    /// The embedded schema for form binding specs.
    pub fn form_binding_spec() -> Self {
        Self::compile(&form_binding_spec_schema()).expect("embedded form_binding_spec schema compiles")
    }

    /// Load a schema from an external file.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema: Value =
            serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::compile(&schema).map_err(|detail| RegistryError::InvalidSpec {
            path: path.to_path_buf(),
            detail,
        })
    }

    fn compile(schema: &Value) -> Result<Self, String> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| format!("failed to compile schema: {e}"))?;
        Ok(Self { compiled })
    }

    /// Validate a document, reporting every violation with its instance
    /// path.
    pub fn check(&self, doc: &Value) -> Result<(), Vec<String>> {
        if let Err(violations) = self.compiled.validate(doc) {
            return Err(violations
                .map(|e| format!("{e} at {}", e.instance_path))
                .collect());
        }
        Ok(())
    }
}

fn integer_range_band() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "min": { "type": "integer" },
            "max": { "type": "integer" },
            "label": { "type": "string", "minLength": 1 },
            "severity": { "type": "integer", "minimum": 0 },
            "description": { "type": "string" }
        },
        "required": ["min", "max", "label", "severity"],
        "additionalProperties": false
    })
}

pub fn measure_spec_schema() -> Value {
    serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Measure Spec",
        "type": "object",
        "properties": {
            "measure_id": { "type": "string", "minLength": 1 },
            "version": { "type": "string", "pattern": "^\\d+\\.\\d+\\.\\d+$" },
            "name": { "type": "string", "minLength": 1 },
            "description": { "type": "string" },
            "kind": { "enum": ["questionnaire", "lab", "vital", "wearable"] },
            "items": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "item_id": { "type": "string", "minLength": 1 },
                        "position": { "type": "integer", "minimum": 1 },
                        "text": { "type": "string" },
                        "response_map": {
                            "type": "object",
                            "additionalProperties": { "type": "integer" }
                        },
                        "min_value": { "type": "integer" },
                        "max_value": { "type": "integer" }
                    },
                    "required": [
                        "item_id", "position", "text",
                        "response_map", "min_value", "max_value"
                    ],
                    "additionalProperties": false
                }
            },
            "scales": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "scale_id": { "type": "string", "minLength": 1 },
                        "name": { "type": "string" },
                        "items": {
                            "type": "array",
                            "minItems": 1,
                            "items": { "type": "string" }
                        },
                        "method": { "enum": ["sum", "average", "sum_then_double"] },
                        "reversed_items": {
                            "type": "array",
                            "items": { "type": "string" }
                        },
                        "min": { "type": "integer" },
                        "max": { "type": "integer" },
                        "missing_allowed": { "type": "integer", "minimum": 0 },
                        "interpretations": {
                            "type": "array",
                            "minItems": 1,
                            "items": integer_range_band()
                        }
                    },
                    "required": [
                        "scale_id", "name", "items", "method",
                        "min", "max", "interpretations"
                    ],
                    "additionalProperties": false
                }
            }
        },
        "required": ["measure_id", "version", "name", "kind", "items", "scales"],
        "additionalProperties": false
    })
}

pub fn form_binding_spec_schema() -> Value {
    serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Form Binding Spec",
        "type": "object",
        "properties": {
            "binding_id": { "type": "string", "minLength": 1 },
            "version": { "type": "string", "pattern": "^\\d+\\.\\d+\\.\\d+$" },
            "form_id": { "type": "string", "minLength": 1 },
            "description": { "type": "string" },
            "sections": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "measure_id": { "type": "string", "minLength": 1 },
                        "measure_version": { "type": "string", "pattern": "^\\d+\\.\\d+\\.\\d+$" },
                        "bindings": {
                            "type": "array",
                            "minItems": 1,
                            "items": {
                                "type": "object",
                                "properties": {
                                    "item_id": { "type": "string", "minLength": 1 },
                                    "by": { "enum": ["field_key", "question_text"] },
                                    "value": { "type": "string", "minLength": 1 }
                                },
                                "required": ["item_id", "by", "value"],
                                "additionalProperties": false
                            }
                        }
                    },
                    "required": ["measure_id", "measure_version", "bindings"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["binding_id", "version", "form_id", "sections"],
        "additionalProperties": false
    })
}
