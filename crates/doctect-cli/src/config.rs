//! # Configuration Loading
//!
//! Reads a `doctect` config file (JSON or YAML), migrates the legacy
//! generation when detected, validates against `config_v3`, and exposes
//! the typed views the parser consumes.
//!
//! Legacy detection is structural: a top-level `runTests` key marks a
//! `config_v2` document, since the current generation hoisted that
//! nesting away.

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;

use doctect_parse::FileType;
use doctect_schema::{transform_to_schema_key, validate, TransformRequest, ValidationRequest};

use crate::io::read_document;

/// A validated, current-generation configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The full `config_v3` object, defaults applied.
    pub raw: Value,
    /// Parser-facing settings extracted from `raw`.
    pub parser: doctect_parse::Config,
    /// File-type descriptors; the built-in Markdown descriptor when the
    /// config declares none.
    pub file_types: Vec<FileType>,
}

impl Default for LoadedConfig {
    fn default() -> Self {
        LoadedConfig {
            raw: serde_json::json!({}),
            parser: doctect_parse::Config::default(),
            file_types: vec![FileType::markdown()],
        }
    }
}

/// Load and validate a config file.
///
/// # Errors
///
/// Unreadable or unparsable files, a failed legacy migration, and a
/// document that does not validate as `config_v3` all fail the load.
pub fn load_config(path: &Path) -> anyhow::Result<LoadedConfig> {
    let document = read_document(path)?;
    from_value(document).with_context(|| format!("invalid config {}", path.display()))
}

/// Build a [`LoadedConfig`] from an already-parsed document.
pub fn from_value(document: Value) -> anyhow::Result<LoadedConfig> {
    let current = if document.get("runTests").is_some() {
        transform_to_schema_key(&TransformRequest {
            current_schema: "config_v2",
            target_schema: "config_v3",
            object: &document,
        })
        .context("could not migrate legacy config")?
    } else {
        document
    };

    let validation = validate(&ValidationRequest {
        schema_key: "config_v3",
        object: &current,
        add_defaults: true,
    })?;
    if !validation.valid {
        bail!("config does not conform to config_v3:\n{}", validation.errors);
    }
    let raw = validation.object;

    let parser: doctect_parse::Config = serde_json::from_value(raw.clone())
        .context("could not extract parser settings from config")?;

    let file_types = match raw.get("fileTypes").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries
            .iter()
            .map(|entry| serde_json::from_value(entry.clone()))
            .collect::<Result<Vec<FileType>, _>>()
            .context("could not deserialize fileTypes")?,
        _ => vec![FileType::markdown()],
    };

    Ok(LoadedConfig { raw, parser, file_types })
}
