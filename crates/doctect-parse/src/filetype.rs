//! # File-Type Descriptors and Parser Configuration
//!
//! Typed views of the `config_v3` fields the content parser consumes.
//! These deserialize from the validated config object; unknown fields
//! are ignored so that execution-oriented config keys (input, output,
//! contexts, ...) pass through untouched.

use std::collections::BTreeMap;

use doctect_core::LogLevel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parser-relevant configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Run markup rules against the content. Individual tests may opt
    /// out via their own `detectSteps` field.
    pub detect_steps: bool,
    /// Origin prepended to relative URLs in detected `goTo` steps.
    pub origin: Option<String>,
    /// Gates the parser's own diagnostics.
    pub log_level: LogLevel,
    /// CMS path-prefix mapping: source files under a mapped prefix get
    /// `sourceIntegration` metadata attached to detected screenshots.
    #[serde(rename = "_herettoPathMapping")]
    pub heretto_path_mapping: BTreeMap<String, String>,
}

/// How tests are embedded in one family of source files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileType {
    pub name: Option<String>,
    /// File extensions this descriptor applies to, without dots.
    pub extensions: Vec<String>,
    pub inline_statements: InlineStatements,
    pub markup: Vec<MarkupRule>,
}

/// Regex patterns for author-written statement delimiters. Each list is
/// tried in order; the first matching pattern wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlineStatements {
    pub test_start: Vec<String>,
    pub test_end: Vec<String>,
    pub ignore_start: Vec<String>,
    pub ignore_end: Vec<String>,
    pub step: Vec<String>,
}

/// One markup-to-step inference rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkupRule {
    pub name: Option<String>,
    /// Patterns matched against the full content.
    pub regex: Vec<String>,
    /// Action templates: a string naming a built-in template, or an
    /// object template with `$<n>` placeholders.
    pub actions: Vec<Value>,
    /// Aggregate all matches of this rule into a single derived
    /// statement instead of one step per match.
    pub batch_matches: bool,
}

impl FileType {
    /// True when `path` ends with one of this descriptor's extensions.
    pub fn handles_path(&self, path: &str) -> bool {
        let ext = path.rsplit('.').next().unwrap_or_default();
        self.extensions.iter().any(|e| e == ext)
    }

    /// The built-in Markdown descriptor: HTML-comment inline statements
    /// plus link and image markup rules.
    pub fn markdown() -> Self {
        FileType {
            name: Some("markdown".to_string()),
            extensions: vec!["md".to_string(), "markdown".to_string(), "mdx".to_string()],
            inline_statements: InlineStatements {
                test_start: vec![r"<!--\s*test\s*(.*?)\s*-->".to_string()],
                test_end: vec![r"<!--\s*test end\s*-->".to_string()],
                ignore_start: vec![r"<!--\s*test ignore start\s*-->".to_string()],
                ignore_end: vec![r"<!--\s*test ignore end\s*-->".to_string()],
                step: vec![r"<!--\s*step\s+(.*?)\s*-->".to_string()],
            },
            markup: vec![
                MarkupRule {
                    name: Some("images".to_string()),
                    regex: vec![r"!\[[^\]]*\]\(([^)]+)\)".to_string()],
                    actions: vec![Value::String("screenshot".to_string())],
                    batch_matches: false,
                },
                MarkupRule {
                    name: Some("hyperlinks".to_string()),
                    regex: vec![r"[^!]\[[^\]]+\]\(([^)]+)\)".to_string()],
                    actions: vec![Value::String("checkLink".to_string())],
                    batch_matches: false,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_from_config_fragment() {
        let value = json!({
            "detectSteps": true,
            "origin": "https://example.com",
            "logLevel": "debug",
            "_herettoPathMapping": { "docs/cms": "prod-heretto" }
        });
        let config: Config = serde_json::from_value(value).unwrap();
        assert!(config.detect_steps);
        assert_eq!(config.origin.as_deref(), Some("https://example.com"));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(
            config.heretto_path_mapping.get("docs/cms").map(String::as_str),
            Some("prod-heretto")
        );
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let config: Config = serde_json::from_value(json!({})).unwrap();
        assert!(!config.detect_steps);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.heretto_path_mapping.is_empty());
    }

    #[test]
    fn test_file_type_handles_path_by_extension() {
        let markdown = FileType::markdown();
        assert!(markdown.handles_path("docs/guide.md"));
        assert!(markdown.handles_path("README.markdown"));
        assert!(!markdown.handles_path("src/main.rs"));
    }

    #[test]
    fn test_markup_rule_deserializes_camel_case() {
        let value = json!({
            "name": "code blocks",
            "regex": ["```bash\\n([\\s\\S]*?)```"],
            "actions": ["runShell"],
            "batchMatches": true
        });
        let rule: MarkupRule = serde_json::from_value(value).unwrap();
        assert!(rule.batch_matches);
        assert_eq!(rule.regex.len(), 1);
    }
}
