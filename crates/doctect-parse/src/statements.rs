//! # Statement-Body Parsing Utilities
//!
//! Inline statements carry a body in one of several author-friendly
//! notations. [`parse_object`] tries them in a fixed order:
//!
//! 1. XML-attribute pairs (`testId="setup" detectSteps=false`)
//! 2. Strict JSON (object top level only)
//! 3. Escaped/double-encoded JSON, with two unescape strategies
//! 4. YAML (mapping top level only)
//!
//! Anything that does not yield an object is `None` — the caller treats
//! the statement as an empty skeleton or drops it.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use thiserror::Error;

use doctect_core::yaml_to_json;

/// Type error from [`replace_numeric_variables`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionError {
    /// The substitution subject was neither a string nor an object.
    #[error("Invalid stringOrObject type.")]
    InvalidSubject,
    /// The values argument was not an object.
    #[error("Invalid values type.")]
    InvalidValues,
}

static YAML_KEY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.$-]+\s*:").expect("static pattern"));
static ATTRIBUTE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w.$-]+)=(?:"([^"]*)"|'([^']*)'|(\S+))"#).expect("static pattern")
});
static DIGITS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("static pattern"));
static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").expect("static pattern"));

/// Parse XML-attribute-style `key=value` pairs into an object.
///
/// Returns `None` for input that looks like JSON (`{`/`[` prefix) or
/// YAML (`key:`/`-` prefix) — those are left for [`parse_object`]'s
/// later strategies — and for input containing no pairs at all.
///
/// Dot-separated keys build nested objects, silently overwriting a
/// non-object intermediate value. Unquoted `true`/`false` coerce to
/// booleans and unquoted digit-only values to numbers.
pub fn parse_xml_attributes(input: &str) -> Option<Value> {
    let trimmed = input.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('{')
        || trimmed.starts_with('[')
        || trimmed.starts_with('-')
        || YAML_KEY_PREFIX.is_match(trimmed)
    {
        return None;
    }

    let mut out = Map::new();
    let mut found = false;
    for caps in ATTRIBUTE_PAIR.captures_iter(trimmed) {
        found = true;
        let key = caps.get(1).map_or("", |m| m.as_str());
        let quoted = caps.get(2).or_else(|| caps.get(3));
        let value = match quoted {
            Some(m) => Value::String(m.as_str().to_string()),
            None => coerce_scalar(caps.get(4).map_or("", |m| m.as_str())),
        };
        insert_dotted(&mut out, key, value);
    }
    found.then_some(Value::Object(out))
}

fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ if DIGITS_ONLY.is_match(raw) => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

fn insert_dotted(out: &mut Map<String, Value>, key: &str, value: Value) {
    let mut segments = key.split('.').peekable();
    let mut current = out;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => current = map,
            _ => return,
        }
    }
}

/// Parse a statement body into an object, trying each notation in order.
/// Array and primitive top-level results are rejected at every stage.
pub fn parse_object(input: &str) -> Option<Value> {
    if let Some(object) = parse_xml_attributes(input) {
        return Some(object);
    }

    if let Ok(value) = serde_json::from_str::<Value>(input) {
        if value.is_object() {
            return Some(value);
        }
    }

    // Double-encoded JSON shows up when statement bodies are themselves
    // serialized into an attribute. Two unescape strategies, tried in
    // order of least destruction.
    let unescaped_quotes = input.replace("\\\"", "\"");
    let unescaped_full = input.replace("\\\\", "\\").replace("\\\"", "\"");
    for candidate in [unescaped_quotes, unescaped_full] {
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            if value.is_object() {
                return Some(value);
            }
        }
    }

    if let Ok(yaml) = serde_yaml::from_str::<serde_yaml::Value>(input) {
        if let Ok(value) = yaml_to_json(&yaml) {
            if value.is_object() {
                return Some(value);
            }
        }
    }

    None
}

/// Replace `$<n>` tokens in a string or (recursively) an object.
///
/// Per-string resolution is all-or-nothing: a string with any unresolved
/// token yields `None` rather than a partial substitution. Inside an
/// object, a child string resolving to `None` removes its key (pruning);
/// inside an array it removes the element.
///
/// # Errors
///
/// [`SubstitutionError::InvalidSubject`] if the subject is neither a
/// string nor an object; [`SubstitutionError::InvalidValues`] if
/// `values` is not an object.
pub fn replace_numeric_variables(
    subject: &Value,
    values: &Value,
) -> Result<Option<Value>, SubstitutionError> {
    let Some(values) = values.as_object() else {
        return Err(SubstitutionError::InvalidValues);
    };
    match subject {
        Value::String(s) => Ok(substitute_string(s, values)),
        Value::Object(map) => Ok(Some(substitute_object(map, values))),
        _ => Err(SubstitutionError::InvalidSubject),
    }
}

fn substitute_string(s: &str, values: &Map<String, Value>) -> Option<Value> {
    let mut unresolved = false;
    let replaced = NUMERIC_TOKEN.replace_all(s, |caps: &Captures| {
        match values.get(&caps[1]) {
            Some(Value::String(v)) => v.clone(),
            Some(other) => other.to_string(),
            None => {
                unresolved = true;
                String::new()
            }
        }
    });
    if unresolved {
        None
    } else {
        Some(Value::String(replaced.into_owned()))
    }
}

fn substitute_object(map: &Map<String, Value>, values: &Map<String, Value>) -> Value {
    let mut out = Map::new();
    for (key, child) in map {
        match substitute_child(child, values) {
            Some(value) => {
                out.insert(key.clone(), value);
            }
            None => {
                // Pruned, not nulled.
            }
        }
    }
    Value::Object(out)
}

fn substitute_child(child: &Value, values: &Map<String, Value>) -> Option<Value> {
    match child {
        Value::String(s) => substitute_string(s, values),
        Value::Object(map) => Some(substitute_object(map, values)),
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| substitute_child(item, values))
                .collect(),
        )),
        other => Some(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_xml_attributes_basic_pairs() {
        let parsed = parse_xml_attributes(r#"testId="setup" detectSteps=false retries=3"#).unwrap();
        assert_eq!(parsed["testId"], "setup");
        assert_eq!(parsed["detectSteps"], false);
        assert_eq!(parsed["retries"], 3);
    }

    #[test]
    fn test_xml_attributes_dot_notation_nests() {
        let parsed = parse_xml_attributes(r#"goTo.url="https://example.com" goTo.origin='o'"#)
            .unwrap();
        assert_eq!(parsed["goTo"]["url"], "https://example.com");
        assert_eq!(parsed["goTo"]["origin"], "o");
    }

    #[test]
    fn test_xml_attributes_overwrites_non_object_intermediate() {
        let parsed = parse_xml_attributes(r#"a=1 a.b=2"#).unwrap();
        assert_eq!(parsed["a"]["b"], 2);
    }

    #[test]
    fn test_xml_attributes_rejects_json_and_yaml_shapes() {
        assert!(parse_xml_attributes(r#"{"a": 1}"#).is_none());
        assert!(parse_xml_attributes("[1, 2]").is_none());
        assert!(parse_xml_attributes("key: value").is_none());
        assert!(parse_xml_attributes("- item").is_none());
    }

    #[test]
    fn test_xml_attributes_rejects_pairless_input() {
        assert!(parse_xml_attributes("just some words").is_none());
        assert!(parse_xml_attributes("").is_none());
    }

    #[test]
    fn test_parse_object_strict_json() {
        let parsed = parse_object(r#"{"steps": [{"wait": 500}]}"#).unwrap();
        assert_eq!(parsed["steps"][0]["wait"], 500);
    }

    #[test]
    fn test_parse_object_rejects_json_array_and_primitive() {
        assert!(parse_object("[1, 2, 3]").is_none());
        assert!(parse_object("42").is_none());
        assert!(parse_object("\"quoted\"").is_none());
    }

    #[test]
    fn test_parse_object_escaped_json() {
        let parsed = parse_object(r#"{\"testId\": \"escaped\"}"#).unwrap();
        assert_eq!(parsed["testId"], "escaped");
    }

    #[test]
    fn test_parse_object_yaml_mapping() {
        let parsed = parse_object("testId: from-yaml\nsteps: []\n").unwrap();
        assert_eq!(parsed["testId"], "from-yaml");
        assert_eq!(parsed["steps"], json!([]));
    }

    #[test]
    fn test_parse_object_unparsable_is_none() {
        assert!(parse_object("<<<not a thing>>>").is_none());
    }

    #[test]
    fn test_replace_all_or_nothing_per_string() {
        let result =
            replace_numeric_variables(&json!("Hello $0 and $1"), &json!({ "0": "world" }))
                .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_replace_full_resolution() {
        let result = replace_numeric_variables(
            &json!("Hello $0 and $1"),
            &json!({ "0": "world", "1": "moon" }),
        )
        .unwrap();
        assert_eq!(result, Some(json!("Hello world and moon")));
    }

    #[test]
    fn test_replace_prunes_unresolved_object_keys() {
        let result = replace_numeric_variables(
            &json!({ "checkLink": { "url": "$1", "origin": "$2" }, "stepId": "fixed" }),
            &json!({ "1": "https://example.com" }),
        )
        .unwrap()
        .unwrap();
        assert_eq!(result["checkLink"]["url"], "https://example.com");
        assert!(result["checkLink"].get("origin").is_none());
        assert_eq!(result["stepId"], "fixed");
    }

    #[test]
    fn test_replace_invalid_subject_type() {
        assert_eq!(
            replace_numeric_variables(&json!(42), &json!({})).unwrap_err(),
            SubstitutionError::InvalidSubject
        );
    }

    #[test]
    fn test_replace_invalid_values_type() {
        assert_eq!(
            replace_numeric_variables(&json!("x"), &json!([])).unwrap_err(),
            SubstitutionError::InvalidValues
        );
    }

    #[test]
    fn test_replace_non_string_value_stringifies_inline() {
        let result =
            replace_numeric_variables(&json!("port $1"), &json!({ "1": 8080 })).unwrap();
        assert_eq!(result, Some(json!("port 8080")));
    }
}
