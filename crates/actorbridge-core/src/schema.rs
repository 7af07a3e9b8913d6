//! Input schema model
//!
//! Parses a provider's raw JSON-Schema-like document into an ordered,
//! strongly typed view the form layer can match on exhaustively. Only the
//! subset of the schema vocabulary the form layer consumes is represented:
//! string, integer, number, boolean, array, object, plus enum options and
//! the length/range bounds.

use serde_json::Value;

use crate::error::SchemaError;

/// How array elements are shaped, as far as the form layer cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayItemShape {
    /// Elements are `{ "url": <string> }` records. Freeform text coerces to
    /// one record per non-blank line.
    UrlObject,
    /// Any other element shape; entries pass through untouched.
    #[default]
    Opaque,
}

/// Tagged union of the property types the form layer understands.
///
/// One variant per schema `type`, so callers can match exhaustively instead
/// of probing dynamic fields.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    String {
        min_length: Option<u64>,
        max_length: Option<u64>,
        /// Ordered list of allowed values, when the property is an enum.
        enum_values: Option<Vec<String>>,
    },
    Integer {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Array {
        items: ArrayItemShape,
    },
    Object,
}

impl PropertyKind {
    /// Short name of the underlying schema type.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyKind::String { .. } => "string",
            PropertyKind::Integer { .. } => "integer",
            PropertyKind::Number { .. } => "number",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Array { .. } => "array",
            PropertyKind::Object => "object",
        }
    }
}

/// A single named input property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Human-facing label, if declared.
    pub title: Option<String>,

    /// Help text, if declared.
    pub description: Option<String>,

    /// Declared default value, if any.
    pub default: Option<Value>,

    /// Type descriptor.
    pub kind: PropertyKind,
}

/// Immutable, ordered view of an actor's declared input shape.
///
/// Invariant: every name in the required set exists in `properties`.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    properties: Vec<(String, PropertyDescriptor)>,
    required: Vec<String>,
}

impl SchemaModel {
    /// Build a model from a raw schema document.
    ///
    /// Fails with `SchemaError::Malformed` if `properties` is missing or not
    /// an object, or if a `required` name has no matching property. A
    /// property with a missing or unrecognised `type` degrades to the string
    /// kind rather than failing.
    pub fn from_value(doc: &Value) -> Result<Self, SchemaError> {
        let props = doc
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| SchemaError::Malformed {
                detail: "schema must declare a 'properties' object".to_string(),
            })?;

        let mut properties = Vec::with_capacity(props.len());
        for (name, raw) in props {
            let descriptor = parse_property(name, raw)?;
            properties.push((name.clone(), descriptor));
        }

        let mut required = Vec::new();
        if let Some(raw_required) = doc.get("required") {
            let names = raw_required
                .as_array()
                .ok_or_else(|| SchemaError::Malformed {
                    detail: "'required' must be an array of property names".to_string(),
                })?;
            for entry in names {
                let name = entry.as_str().ok_or_else(|| SchemaError::Malformed {
                    detail: "'required' entries must be strings".to_string(),
                })?;
                if !properties.iter().any(|(n, _)| n == name) {
                    return Err(SchemaError::Malformed {
                        detail: format!("required field '{name}' has no matching property"),
                    });
                }
                required.push(name.to_string());
            }
        }

        Ok(SchemaModel {
            properties,
            required,
        })
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.properties.iter().map(|(n, d)| (n.as_str(), d))
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    /// Names of required fields, in declaration order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Whether the given field is required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|n| n == name)
    }

    /// Number of declared properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the schema declares no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

fn parse_property(name: &str, raw: &Value) -> Result<PropertyDescriptor, SchemaError> {
    let obj = raw.as_object().ok_or_else(|| SchemaError::Malformed {
        detail: format!("property '{name}' must be an object"),
    })?;

    let kind = match obj.get("type").and_then(Value::as_str) {
        Some("integer") => PropertyKind::Integer {
            minimum: obj.get("minimum").and_then(Value::as_f64),
            maximum: obj.get("maximum").and_then(Value::as_f64),
        },
        Some("number") => PropertyKind::Number {
            minimum: obj.get("minimum").and_then(Value::as_f64),
            maximum: obj.get("maximum").and_then(Value::as_f64),
        },
        Some("boolean") => PropertyKind::Boolean,
        Some("array") => PropertyKind::Array {
            items: parse_item_shape(obj.get("items")),
        },
        Some("object") => PropertyKind::Object,
        // "string", unknown, or missing: render as freeform text.
        _ => PropertyKind::String {
            min_length: obj.get("minLength").and_then(Value::as_u64),
            max_length: obj.get("maxLength").and_then(Value::as_u64),
            enum_values: obj.get("enum").and_then(Value::as_array).map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
        },
    };

    Ok(PropertyDescriptor {
        title: obj.get("title").and_then(Value::as_str).map(str::to_string),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        default: obj.get("default").cloned(),
        kind,
    })
}

/// Recognise the URL-list convention: array items declared as an object with
/// a string-typed `url` property.
fn parse_item_shape(items: Option<&Value>) -> ArrayItemShape {
    let Some(items) = items else {
        return ArrayItemShape::Opaque;
    };
    let is_url_object = items.get("type").and_then(Value::as_str) == Some("object")
        && items
            .get("properties")
            .and_then(|p| p.get("url"))
            .and_then(|u| u.get("type"))
            .and_then(Value::as_str)
            == Some("string");
    if is_url_object {
        ArrayItemShape::UrlObject
    } else {
        ArrayItemShape::Opaque
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn crawler_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "startUrls": {
                    "type": "array",
                    "title": "Start URLs",
                    "items": {
                        "type": "object",
                        "properties": {
                            "url": { "type": "string" }
                        },
                        "required": ["url"]
                    }
                },
                "maxCrawlPages": {
                    "type": "integer",
                    "title": "Max Crawl Pages",
                    "default": 1
                }
            },
            "required": ["startUrls"]
        })
    }

    #[test]
    fn test_parse_preserves_property_order() {
        let schema = SchemaModel::from_value(&crawler_schema()).expect("parse failed");
        let names: Vec<&str> = schema.properties().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["startUrls", "maxCrawlPages"]);
    }

    #[test]
    fn test_parse_required_set() {
        let schema = SchemaModel::from_value(&crawler_schema()).expect("parse failed");
        assert!(schema.is_required("startUrls"));
        assert!(!schema.is_required("maxCrawlPages"));
    }

    #[test]
    fn test_url_list_convention_detected() {
        let schema = SchemaModel::from_value(&crawler_schema()).expect("parse failed");
        let descriptor = schema.property("startUrls").expect("missing property");
        assert_eq!(
            descriptor.kind,
            PropertyKind::Array {
                items: ArrayItemShape::UrlObject
            }
        );
    }

    #[test]
    fn test_plain_array_is_opaque() {
        let doc = json!({
            "properties": {
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        });
        let schema = SchemaModel::from_value(&doc).expect("parse failed");
        assert_eq!(
            schema.property("tags").unwrap().kind,
            PropertyKind::Array {
                items: ArrayItemShape::Opaque
            }
        );
    }

    #[test]
    fn test_missing_properties_is_malformed() {
        let err = SchemaModel::from_value(&json!({ "type": "object" })).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
    }

    #[test]
    fn test_properties_not_object_is_malformed() {
        let err = SchemaModel::from_value(&json!({ "properties": [1, 2] })).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
    }

    #[test]
    fn test_required_without_property_is_malformed() {
        let doc = json!({
            "properties": { "url": { "type": "string" } },
            "required": ["url", "missing"]
        });
        let err = SchemaModel::from_value(&doc).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
    }

    #[test]
    fn test_unknown_type_degrades_to_string() {
        let doc = json!({
            "properties": {
                "odd": { "type": "datetime" },
                "untyped": { "title": "No type at all" }
            }
        });
        let schema = SchemaModel::from_value(&doc).expect("parse failed");
        for name in ["odd", "untyped"] {
            assert_eq!(
                schema.property(name).unwrap().kind.type_name(),
                "string",
                "property '{name}' should degrade to string"
            );
        }
    }

    #[test]
    fn test_enum_values_kept_in_order() {
        let doc = json!({
            "properties": {
                "mode": { "type": "string", "enum": ["fast", "slow", "auto"] }
            }
        });
        let schema = SchemaModel::from_value(&doc).expect("parse failed");
        match &schema.property("mode").unwrap().kind {
            PropertyKind::String { enum_values, .. } => {
                let expected = vec!["fast".to_string(), "slow".to_string(), "auto".to_string()];
                assert_eq!(enum_values.as_ref(), Some(&expected));
            }
            other => panic!("expected string kind, got {other:?}"),
        }
    }
}
