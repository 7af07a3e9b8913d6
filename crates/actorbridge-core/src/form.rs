//! Schema-driven input form compilation
//!
//! Turns a `SchemaModel` plus raw user edits into a validated
//! `InputValueMap` ready for submission. All operations here are total:
//! `validate` reports problems as data instead of failing, and `coerce`
//! degrades malformed mid-edit input to a safe value instead of propagating
//! a parse fault.

use serde_json::{json, Map, Value};

use crate::client::InputValueMap;
use crate::schema::{ArrayItemShape, PropertyKind, SchemaModel};

/// Why a candidate value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationReason {
    RequiredMissing,
    TooShort,
    TooLong,
    BelowMinimum,
    AboveMaximum,
    Malformed,
}

/// A single field-level validation finding.
///
/// Data, not a fault: a set of these accompanies every `validate` call and
/// submission must not proceed while the set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationError {
    /// Field name the finding applies to.
    pub field: String,

    /// Machine-readable reason.
    pub reason: ValidationReason,

    /// Human-readable detail.
    pub detail: String,
}

impl ValidationError {
    fn new(field: &str, reason: ValidationReason, detail: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            reason,
            detail: detail.into(),
        }
    }
}

/// Compiles schema + user edits into typed, validated input values.
pub struct FormCompiler;

impl FormCompiler {
    /// Seed an input map for the given schema.
    ///
    /// Each property gets its declared `default` when present, otherwise the
    /// type's empty value: `[]` for arrays, `{}` for objects, `false` for
    /// booleans, `""` for everything else. Key order follows schema property
    /// order.
    pub fn default_values(schema: &SchemaModel) -> InputValueMap {
        let mut values = InputValueMap::new();
        for (name, descriptor) in schema.properties() {
            let seed = match &descriptor.default {
                Some(value) => value.clone(),
                None => empty_value(&descriptor.kind),
            };
            values.insert(name.to_string(), seed);
        }
        values
    }

    /// Check a candidate input map against the schema.
    ///
    /// Returns the (possibly empty) set of findings; never fails. Required
    /// fields that are absent or empty report `RequiredMissing` and skip all
    /// further checks for that field; an empty optional string still honors
    /// its declared length bounds. Unknown keys in the candidate are
    /// ignored. Arrays and objects are only checked for required presence
    /// and runtime type; their internal structure is the provider's to
    /// validate.
    pub fn validate(schema: &SchemaModel, candidate: &InputValueMap) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (name, descriptor) in schema.properties() {
            let value = candidate.get(name);

            if is_empty(value) {
                if schema.is_required(name) {
                    errors.push(ValidationError::new(
                        name,
                        ValidationReason::RequiredMissing,
                        "this field is required",
                    ));
                    continue;
                }
                // An empty optional string still has a measurable length;
                // the other kinds have nothing left to check when empty.
                if !matches!(descriptor.kind, PropertyKind::String { .. }) {
                    continue;
                }
            }
            let Some(value) = value else { continue };
            if value.is_null() {
                continue;
            }

            match &descriptor.kind {
                PropertyKind::String {
                    min_length,
                    max_length,
                    ..
                } => match value.as_str() {
                    Some(text) => {
                        let length = text.chars().count() as u64;
                        if let Some(min) = min_length {
                            if length < *min {
                                errors.push(ValidationError::new(
                                    name,
                                    ValidationReason::TooShort,
                                    format!("minimum length is {min} characters"),
                                ));
                            }
                        }
                        if let Some(max) = max_length {
                            if length > *max {
                                errors.push(ValidationError::new(
                                    name,
                                    ValidationReason::TooLong,
                                    format!("maximum length is {max} characters"),
                                ));
                            }
                        }
                    }
                    None => errors.push(type_mismatch(name, "text", value)),
                },
                PropertyKind::Integer { minimum, maximum }
                | PropertyKind::Number { minimum, maximum } => match value.as_f64() {
                    Some(number) => {
                        if let Some(min) = minimum {
                            if number < *min {
                                errors.push(ValidationError::new(
                                    name,
                                    ValidationReason::BelowMinimum,
                                    format!("minimum value is {min}"),
                                ));
                            }
                        }
                        if let Some(max) = maximum {
                            if number > *max {
                                errors.push(ValidationError::new(
                                    name,
                                    ValidationReason::AboveMaximum,
                                    format!("maximum value is {max}"),
                                ));
                            }
                        }
                    }
                    None => errors.push(type_mismatch(name, "a number", value)),
                },
                PropertyKind::Boolean => {
                    if !value.is_boolean() {
                        errors.push(type_mismatch(name, "a boolean", value));
                    }
                }
                PropertyKind::Array { .. } => {
                    if !value.is_array() {
                        errors.push(type_mismatch(name, "an array", value));
                    }
                }
                PropertyKind::Object => {
                    if !value.is_object() {
                        errors.push(type_mismatch(name, "an object", value));
                    }
                }
            }
        }

        errors
    }

    /// Convert raw user text into a value of the property's runtime kind.
    ///
    /// Never fails: unparsable numeric text degrades to the type's empty
    /// value, and object text that is not valid JSON passes through as the
    /// raw string so a half-typed literal does not break the editing session
    /// (`validate` rejects it later).
    pub fn coerce(raw: &str, kind: &PropertyKind) -> Value {
        match kind {
            PropertyKind::String { .. } => Value::String(raw.to_string()),
            PropertyKind::Integer { .. } => match raw.trim().parse::<i64>() {
                Ok(number) => Value::Number(number.into()),
                Err(_) => empty_value(kind),
            },
            PropertyKind::Number { .. } => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| empty_value(kind)),
            PropertyKind::Boolean => Value::Bool(matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            )),
            PropertyKind::Array {
                items: ArrayItemShape::UrlObject,
            } => Value::Array(
                non_blank_lines(raw)
                    .map(|line| json!({ "url": line.trim() }))
                    .collect(),
            ),
            PropertyKind::Array {
                items: ArrayItemShape::Opaque,
            } => Value::Array(
                non_blank_lines(raw)
                    .map(|line| Value::String(line.to_string()))
                    .collect(),
            ),
            PropertyKind::Object => serde_json::from_str(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
        }
    }
}

/// Empty-value convention per type.
fn empty_value(kind: &PropertyKind) -> Value {
    match kind {
        PropertyKind::Array { .. } => Value::Array(Vec::new()),
        PropertyKind::Object => Value::Object(Map::new()),
        PropertyKind::Boolean => Value::Bool(false),
        // String, integer, and number fields all seed as empty text, which
        // is how an untouched form field reads.
        _ => Value::String(String::new()),
    }
}

/// Whether a candidate value counts as absent for required-field checks.
fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(fields)) => fields.is_empty(),
        Some(Value::Bool(flag)) => !flag,
        Some(Value::Number(_)) => false,
    }
}

fn type_mismatch(field: &str, expected: &str, value: &Value) -> ValidationError {
    ValidationError::new(
        field,
        ValidationReason::Malformed,
        format!("expected {expected}, got {}", json_kind(value)),
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn non_blank_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().filter(|line| !line.trim().is_empty())
}
