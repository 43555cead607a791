//! # Structural Validation with Default Coercion
//!
//! Validates a candidate object against a registered schema definition:
//! type matching, required-property presence, enum membership, pattern
//! matching on strings, recursion through `properties`/`items`, and
//! `anyOf` resolved by the first structurally-matching variant.
//!
//! ## Non-Mutation Invariant
//!
//! The caller's object is never mutated. Validation operates on a deep
//! clone; the (optionally defaulted) clone is returned in the result.
//! This is a correctness invariant, not an optimization — downstream
//! callers hold references to the original object.
//!
//! ## Failure Is a Result, Not an Error
//!
//! An unknown schema key and a structurally invalid object both produce
//! `valid: false` with a descriptive error string. Only caller
//! precondition violations (missing key, missing object) return `Err`.

use doctect_core::InputError;
use serde_json::Value;

use crate::registry;

/// Arguments to [`validate`].
#[derive(Debug, Clone)]
pub struct ValidationRequest<'a> {
    /// Registered schema key, e.g. `"step_v3"`.
    pub schema_key: &'a str,
    /// Candidate object. Never mutated.
    pub object: &'a Value,
    /// Insert schema-declared `default` values for missing properties.
    pub add_defaults: bool,
}

/// Outcome of a validation.
#[derive(Debug, Clone)]
pub struct Validation {
    /// True when the object conforms to the schema.
    pub valid: bool,
    /// Empty on success; human-readable violation text otherwise.
    pub errors: String,
    /// On success, the (defaulted) working clone; on failure, a clone of
    /// the caller's original object.
    pub object: Value,
}

/// Validate `object` against the schema registered under `schema_key`.
///
/// # Errors
///
/// Returns [`InputError`] when `schema_key` is blank or `object` is null.
/// Every data-quality problem, including an unregistered schema key, is
/// reported through the returned [`Validation`] instead.
pub fn validate(request: &ValidationRequest) -> Result<Validation, InputError> {
    if request.schema_key.trim().is_empty() {
        return Err(InputError::SchemaKeyRequired);
    }
    if request.object.is_null() {
        return Err(InputError::ObjectRequired);
    }

    let Some(schema) = registry::schema(request.schema_key) else {
        return Ok(Validation {
            valid: false,
            errors: format!("Schema not found: {}", request.schema_key),
            object: request.object.clone(),
        });
    };

    let mut working = request.object.clone();
    if request.add_defaults {
        apply_defaults(schema, &mut working);
    }

    let mut errors = Vec::new();
    check_node(schema, &working, "", &mut errors);

    if errors.is_empty() {
        Ok(Validation {
            valid: true,
            errors: String::new(),
            object: working,
        })
    } else {
        Ok(Validation {
            valid: false,
            errors: errors.join("\n"),
            object: request.object.clone(),
        })
    }
}

/// True when `value` structurally conforms to `schema`.
pub(crate) fn conforms(schema: &Value, value: &Value) -> bool {
    let mut errors = Vec::new();
    check_node(schema, value, "", &mut errors);
    errors.is_empty()
}

fn location(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}

fn check_node(schema: &Value, value: &Value, path: &str, errors: &mut Vec<String>) {
    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !matches_type(value, expected) {
            errors.push(format!("{}: expected type {expected}", location(path)));
            return;
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            errors.push(format!(
                "{}: {value} is not one of the allowed values",
                location(path)
            ));
        }
    }

    if let (Some(pattern), Some(s)) = (schema.get("pattern").and_then(Value::as_str), value.as_str())
    {
        // A malformed pattern in a schema definition is skipped rather
        // than failing the document.
        if let Ok(re) = regex::Regex::new(pattern) {
            if !re.is_match(s) {
                errors.push(format!(
                    "{}: {s:?} does not match pattern {pattern:?}",
                    location(path)
                ));
            }
        }
    }

    if let Some(variants) = schema.get("anyOf").and_then(Value::as_array) {
        // First structural match wins; variant order is load-bearing.
        if !variants.iter().any(|variant| conforms(variant, value)) {
            errors.push(format!(
                "{}: does not match any allowed variant",
                location(path)
            ));
        }
    }

    if let Some(object) = value.as_object() {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(name) {
                    errors.push(format!(
                        "{}: required property {name:?} is missing",
                        location(path)
                    ));
                }
            }
        }
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (name, child_schema) in properties {
                if let Some(child) = object.get(name) {
                    check_node(child_schema, child, &format!("{path}/{name}"), errors);
                }
            }
        }
    }

    if let (Some(items), Some(array)) = (schema.get("items"), value.as_array()) {
        for (index, item) in array.iter().enumerate() {
            check_node(items, item, &format!("{path}/{index}"), errors);
        }
    }
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => false,
    }
}

/// Insert schema-declared defaults for missing object properties,
/// recursing through `properties`, `items`, and the first-matching
/// `anyOf` variant.
fn apply_defaults(schema: &Value, value: &mut Value) {
    if let Some(variants) = schema.get("anyOf").and_then(Value::as_array) {
        if let Some(variant) = variants.iter().find(|variant| conforms(variant, value)) {
            apply_defaults(variant, value);
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        if let Some(object) = value.as_object_mut() {
            for (name, child_schema) in properties {
                if !object.contains_key(name) {
                    if let Some(default) = child_schema.get("default") {
                        object.insert(name.clone(), default.clone());
                    }
                }
                if let Some(child) = object.get_mut(name) {
                    apply_defaults(child_schema, child);
                }
            }
        }
    }

    if let Some(items) = schema.get("items") {
        if let Some(array) = value.as_array_mut() {
            for item in array {
                apply_defaults(items, item);
            }
        }
    }
}
