//! # Value Conversion — YAML to JSON
//!
//! Statement bodies and config files may be authored in YAML, but every
//! object in the workspace is processed as a `serde_json::Value` tree.
//! YAML has a richer type system than JSON (tags, non-string keys); the
//! documents this tool consumes use only the JSON-compatible subset.

use serde_json::Value;

/// Convert a `serde_yaml::Value` into the equivalent `serde_json::Value`.
///
/// YAML tags are ignored (the inner value is converted). Non-string map
/// keys are stringified for numbers and booleans and rejected otherwise.
///
/// # Errors
///
/// Returns a descriptive message for floats that JSON cannot represent
/// (NaN, infinity) and for unsupported map key types.
pub fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_and_collections() {
        let yaml_str = r#"
testId: example
count: 42
ratio: 0.5
enabled: true
steps:
  - goTo: "https://example.com"
"#;
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml_str).unwrap();
        let json_value = yaml_to_json(&yaml_value).unwrap();

        assert_eq!(json_value["testId"], "example");
        assert_eq!(json_value["count"], 42);
        assert_eq!(json_value["ratio"], 0.5);
        assert_eq!(json_value["enabled"], true);
        assert_eq!(json_value["steps"][0]["goTo"], "https://example.com");
    }

    #[test]
    fn test_non_string_keys_stringified() {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        let json_value = yaml_to_json(&yaml_value).unwrap();
        assert_eq!(json_value["1"], "one");
        assert_eq!(json_value["true"], "yes");
    }

    #[test]
    fn test_null_maps_to_null() {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str("~").unwrap();
        assert_eq!(yaml_to_json(&yaml_value).unwrap(), Value::Null);
    }
}
