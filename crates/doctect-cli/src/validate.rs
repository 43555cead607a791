//! # Validate Subcommand
//!
//! Validates a JSON or YAML document against a registered schema key.
//! Exits non-zero with the violation text when the document does not
//! conform.

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;

use doctect_schema::{schema_keys, validate, ValidationRequest};

use crate::io::{read_document, write_document};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Registered schema key, e.g. `test_v3` or `step_v3`.
    #[arg(short, long)]
    pub schema: String,

    /// Document to validate (JSON or YAML).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Insert schema-declared defaults into the emitted document.
    #[arg(long)]
    pub add_defaults: bool,

    /// Write the validated (possibly defaulted) document here.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ValidateArgs) -> anyhow::Result<()> {
    let document = read_document(&args.input)?;
    let validation = validate(&ValidationRequest {
        schema_key: &args.schema,
        object: &document,
        add_defaults: args.add_defaults,
    })?;

    if !validation.valid {
        if validation.errors.starts_with("Schema not found") {
            bail!(
                "{}\nKnown schemas: {}",
                validation.errors,
                schema_keys().join(", ")
            );
        }
        bail!(
            "{} does not conform to {}:\n{}",
            args.input.display(),
            args.schema,
            validation.errors
        );
    }

    tracing::info!(schema = %args.schema, "document is valid");
    write_document(args.output.as_deref(), &validation.object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_valid_document_passes() {
        let file = file_with(r#"{"testId": "t", "steps": [{"wait": 500}]}"#);
        let args = ValidateArgs {
            schema: "test_v3".to_string(),
            input: file.path().to_path_buf(),
            add_defaults: false,
            output: None,
        };
        assert!(run(&args).is_ok());
    }

    #[test]
    fn test_invalid_document_fails_with_violations() {
        let file = file_with(r#"{"testId": "t"}"#);
        let args = ValidateArgs {
            schema: "test_v3".to_string(),
            input: file.path().to_path_buf(),
            add_defaults: false,
            output: None,
        };
        let err = run(&args).unwrap_err().to_string();
        assert!(err.contains("steps"), "{err}");
    }

    #[test]
    fn test_unknown_schema_lists_known_keys() {
        let file = file_with("{}");
        let args = ValidateArgs {
            schema: "test_v9".to_string(),
            input: file.path().to_path_buf(),
            add_defaults: false,
            output: None,
        };
        let err = run(&args).unwrap_err().to_string();
        assert!(err.contains("Schema not found: test_v9"), "{err}");
        assert!(err.contains("test_v3"), "{err}");
    }
}
