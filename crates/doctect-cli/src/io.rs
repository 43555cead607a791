//! # Document I/O
//!
//! JSON-or-YAML reading shared by the subcommands, and the common
//! write-to-file-or-stdout output path.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use doctect_core::yaml_to_json;

/// Read a document as JSON, falling back to YAML. `.yaml`/`.yml` paths
/// go straight to the YAML parser so JSON error text never leaks into
/// YAML failure messages.
pub fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    if !is_yaml {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return Ok(value);
        }
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(&text)
        .with_context(|| format!("{} is neither valid JSON nor valid YAML", path.display()))?;
    yaml_to_json(&yaml)
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
}

/// Pretty-print a value to `output`, or stdout when absent.
pub fn write_document(output: Option<&Path>, value: &Value) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, rendered + "\n")
            .with_context(|| format!("could not write {}", path.display())),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_json_document() {
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"wait": 500}}"#).unwrap();
        let value = read_document(file.path()).unwrap();
        assert_eq!(value["wait"], 500);
    }

    #[test]
    fn test_reads_yaml_document() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        write!(file, "goTo:\n  url: https://example.com\n").unwrap();
        let value = read_document(file.path()).unwrap();
        assert_eq!(value["goTo"]["url"], "https://example.com");
    }

    #[test]
    fn test_unparsable_document_is_an_error() {
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        write!(file, "{{ not json : [").unwrap();
        assert!(read_document(file.path()).is_err());
    }
}
