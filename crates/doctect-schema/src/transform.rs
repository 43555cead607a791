//! # Version Transformation — Legacy (v2) to Current (v3)
//!
//! Rewrites user-authored objects conforming to a legacy schema
//! generation into the current generation's shape: per-action field
//! renames, unit conversions (percentage → fraction), nested
//! restructuring, and enum remapping.
//!
//! ## Rule Registry
//!
//! Dispatch is an explicit static table of `(source_key, target_key,
//! rule)` triples — statically enumerable, so the test suite can walk
//! every registered pair. Each rule is a pure function of its input:
//! no I/O, no randomness, deterministic.
//!
//! ## Fail-Closed Contract
//!
//! A transform either returns an object that validates against the
//! *target* schema (defaults applied) or it is an error. An unregistered
//! pair is a programming/config error ([`TransformError::Unsupported`]);
//! a rule whose output fails target validation is a rule-authoring bug or
//! genuinely unrecoverable legacy data ([`TransformError::Invalid`]).

use doctect_core::InputError;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::validate::{validate, ValidationRequest};

/// Arguments to [`transform_to_schema_key`].
#[derive(Debug, Clone)]
pub struct TransformRequest<'a> {
    /// Schema key the object currently conforms to.
    pub current_schema: &'a str,
    /// Schema key the object should be rewritten into.
    pub target_schema: &'a str,
    /// The object to transform. Never mutated.
    pub object: &'a Value,
}

/// Error raised by [`transform_to_schema_key`].
#[derive(Error, Debug)]
pub enum TransformError {
    /// No rule is registered for the requested pair.
    #[error("Can't transform from {current} to {target}.")]
    Unsupported {
        /// Requested source schema key.
        current: String,
        /// Requested target schema key.
        target: String,
    },

    /// A rule produced an object that fails target-schema validation.
    #[error("Invalid object: {errors}")]
    Invalid {
        /// The validator's violation text.
        errors: String,
    },

    /// A caller precondition was violated.
    #[error(transparent)]
    Input(#[from] InputError),
}

/// A pure transformation rule.
pub type TransformFn = fn(&Value) -> Value;

/// Every registered `(source, target)` transformation rule.
pub static TRANSFORMS: &[(&str, &str, TransformFn)] = &[
    ("goTo_v2", "step_v3", go_to_v2_to_step_v3),
    ("find_v2", "step_v3", find_v2_to_step_v3),
    ("checkLink_v2", "step_v3", check_link_v2_to_step_v3),
    ("httpRequest_v2", "step_v3", http_request_v2_to_step_v3),
    ("runShell_v2", "step_v3", run_shell_v2_to_step_v3),
    ("runCode_v2", "step_v3", run_code_v2_to_step_v3),
    ("setVariables_v2", "step_v3", set_variables_v2_to_step_v3),
    ("typeKeys_v2", "step_v3", type_keys_v2_to_step_v3),
    ("saveScreenshot_v2", "step_v3", save_screenshot_v2_to_step_v3),
    ("startRecording_v2", "step_v3", start_recording_v2_to_step_v3),
    ("stopRecording_v2", "step_v3", stop_recording_v2_to_step_v3),
    ("wait_v2", "step_v3", wait_v2_to_step_v3),
    ("context_v2", "context_v3", context_v2_to_v3),
    ("openApi_v2", "openApi_v3", open_api_v2_to_v3),
    ("test_v2", "test_v3", test_v2_to_v3),
    ("spec_v2", "spec_v3", spec_v2_to_v3),
    ("config_v2", "config_v3", config_v2_to_v3),
];

fn rule_for(current: &str, target: &str) -> Option<TransformFn> {
    TRANSFORMS
        .iter()
        .find(|(source_key, target_key, _)| *source_key == current && *target_key == target)
        .map(|(_, _, rule)| *rule)
}

/// Rule for migrating a legacy flat step, dispatched on its `action`
/// discriminator.
fn step_rule(action: &str) -> Option<TransformFn> {
    rule_for(&format!("{action}_v2"), "step_v3")
}

/// Transform `object` from `current_schema` into `target_schema`.
///
/// The identity pair returns the object unchanged. Otherwise the
/// registered rule runs and its output is validated against the target
/// schema with defaults applied; the defaulted object is returned.
///
/// # Errors
///
/// [`TransformError::Unsupported`] for an unregistered pair;
/// [`TransformError::Invalid`] when the rule's output fails target
/// validation.
pub fn transform_to_schema_key(request: &TransformRequest) -> Result<Value, TransformError> {
    if request.current_schema == request.target_schema {
        return Ok(request.object.clone());
    }

    let Some(rule) = rule_for(request.current_schema, request.target_schema) else {
        return Err(TransformError::Unsupported {
            current: request.current_schema.to_string(),
            target: request.target_schema.to_string(),
        });
    };

    let candidate = rule(request.object);
    let validation = validate(&ValidationRequest {
        schema_key: request.target_schema,
        object: &candidate,
        add_defaults: true,
    })?;
    if !validation.valid {
        return Err(TransformError::Invalid {
            errors: validation.errors,
        });
    }
    Ok(validation.object)
}

// ---------------------------------------------------------------------------
// Shared remapping helpers
// ---------------------------------------------------------------------------

fn copy_field(src: &Map<String, Value>, dst: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = src.get(from) {
        dst.insert(to.to_string(), value.clone());
    }
}

/// Legacy steps carry `id` and `description`; current steps carry
/// `stepId` and `description`.
fn copy_step_common(src: &Map<String, Value>, dst: &mut Map<String, Value>) {
    copy_field(src, dst, "id", "stepId");
    copy_field(src, dst, "description", "description");
}

/// Legacy percentages (0–100) become fractions (0–1).
fn percentage_to_fraction(value: &Value) -> Value {
    match value.as_f64().and_then(|f| serde_json::Number::from_f64(f / 100.0)) {
        Some(n) => Value::Number(n),
        None => value.clone(),
    }
}

/// `"byVariation"` always becomes `"aboveVariation"`; every other value
/// (including the string `"true"`) passes through unchanged.
fn remap_overwrite(value: &Value) -> Value {
    if value.as_str() == Some("byVariation") {
        Value::String("aboveVariation".to_string())
    } else {
        value.clone()
    }
}

/// Legacy `setVariables: [{name, regex}]` becomes a `variables` map of
/// `extract(<source>, "<regex>")` runtime expressions.
fn extract_variables(list: &Value, source: &str) -> Option<Value> {
    let items = list.as_array()?;
    let mut variables = Map::new();
    for item in items {
        if let (Some(name), Some(regex)) = (
            item.get("name").and_then(Value::as_str),
            item.get("regex").and_then(Value::as_str),
        ) {
            variables.insert(
                name.to_string(),
                Value::String(format!("extract({source}, \"{regex}\")")),
            );
        }
    }
    (!variables.is_empty()).then(|| Value::Object(variables))
}

fn source_object(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn ensure_string_array(value: &Value) -> Value {
    match value {
        Value::String(s) => json!([s]),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Step rules (v2 action → step_v3)
// ---------------------------------------------------------------------------

fn go_to_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut action = Map::new();
    copy_field(&src, &mut action, "url", "url");
    copy_field(&src, &mut action, "origin", "origin");

    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    step.insert("goTo".into(), Value::Object(action));
    Value::Object(step)
}

fn find_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut action = Map::new();
    copy_field(&src, &mut action, "selector", "selector");
    copy_field(&src, &mut action, "matchText", "elementText");
    copy_field(&src, &mut action, "timeout", "timeout");
    copy_field(&src, &mut action, "moveTo", "moveTo");
    copy_field(&src, &mut action, "click", "click");
    if let Some(type_keys) = src.get("typeKeys").and_then(Value::as_object) {
        let mut type_action = Map::new();
        copy_field(type_keys, &mut type_action, "keys", "keys");
        copy_field(type_keys, &mut type_action, "delay", "inputDelay");
        action.insert("type".into(), Value::Object(type_action));
    }

    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    step.insert("find".into(), Value::Object(action));
    if let Some(variables) = src
        .get("setVariables")
        .and_then(|list| extract_variables(list, "$$element.text"))
    {
        step.insert("variables".into(), variables);
    }
    Value::Object(step)
}

fn check_link_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut action = Map::new();
    copy_field(&src, &mut action, "url", "url");
    copy_field(&src, &mut action, "statusCodes", "statusCodes");

    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    step.insert("checkLink".into(), Value::Object(action));
    Value::Object(step)
}

fn http_request_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut action = Map::new();
    copy_field(&src, &mut action, "url", "url");
    if let Some(method) = src.get("method").and_then(Value::as_str) {
        action.insert("method".into(), Value::String(method.to_lowercase()));
    }
    copy_field(&src, &mut action, "statusCodes", "statusCodes");
    copy_field(&src, &mut action, "timeout", "timeout");

    let mut request = Map::new();
    copy_field(&src, &mut request, "requestData", "body");
    copy_field(&src, &mut request, "requestHeaders", "headers");
    copy_field(&src, &mut request, "requestParams", "parameters");
    if !request.is_empty() {
        action.insert("request".into(), Value::Object(request));
    }

    let mut response = Map::new();
    copy_field(&src, &mut response, "responseData", "body");
    copy_field(&src, &mut response, "responseHeaders", "headers");
    if !response.is_empty() {
        action.insert("response".into(), Value::Object(response));
    }

    if let Some(max_variation) = src.get("maxVariation") {
        action.insert("maxVariation".into(), percentage_to_fraction(max_variation));
    }
    if let Some(overwrite) = src.get("overwrite") {
        action.insert("overwrite".into(), remap_overwrite(overwrite));
    }
    if let Some(open_api) = src.get("openApi").and_then(Value::as_object) {
        let mut migrated = Map::new();
        copy_field(open_api, &mut migrated, "name", "name");
        copy_field(open_api, &mut migrated, "descriptionPath", "descriptionPath");
        copy_field(open_api, &mut migrated, "operationId", "operationId");
        copy_field(open_api, &mut migrated, "requestHeaders", "headers");
        action.insert("openApi".into(), Value::Object(migrated));
    }

    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    step.insert("httpRequest".into(), Value::Object(action));
    if let Some(list) = src.get("envsFromResponseData").and_then(Value::as_array) {
        let mut variables = Map::new();
        for item in list {
            if let (Some(name), Some(filter)) = (
                item.get("name").and_then(Value::as_str),
                item.get("jqFilter").and_then(Value::as_str),
            ) {
                variables.insert(
                    name.to_string(),
                    Value::String(format!("jq($$response.body, \"{filter}\")")),
                );
            }
        }
        if !variables.is_empty() {
            step.insert("variables".into(), Value::Object(variables));
        }
    }
    Value::Object(step)
}

fn shell_like_v2_to_step_v3(value: &Value, action_name: &str) -> Value {
    let src = source_object(value);
    let mut action = Map::new();
    copy_field(&src, &mut action, "command", "command");
    copy_field(&src, &mut action, "language", "language");
    copy_field(&src, &mut action, "code", "code");
    copy_field(&src, &mut action, "args", "args");
    copy_field(&src, &mut action, "workingDirectory", "workingDirectory");
    copy_field(&src, &mut action, "exitCodes", "exitCodes");
    copy_field(&src, &mut action, "timeout", "timeout");
    copy_field(&src, &mut action, "output", "stdio");
    if let Some(max_variation) = src.get("maxVariation") {
        action.insert("maxVariation".into(), percentage_to_fraction(max_variation));
    }
    if let Some(overwrite) = src.get("overwrite") {
        action.insert("overwrite".into(), remap_overwrite(overwrite));
    }

    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    step.insert(action_name.to_string(), Value::Object(action));
    if let Some(variables) = src
        .get("setVariables")
        .and_then(|list| extract_variables(list, "$$stdio.stdout"))
    {
        step.insert("variables".into(), variables);
    }
    Value::Object(step)
}

fn run_shell_v2_to_step_v3(value: &Value) -> Value {
    shell_like_v2_to_step_v3(value, "runShell")
}

fn run_code_v2_to_step_v3(value: &Value) -> Value {
    shell_like_v2_to_step_v3(value, "runCode")
}

fn set_variables_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    // Scalar path, not a nested object.
    copy_field(&src, &mut step, "path", "loadVariables");
    Value::Object(step)
}

fn type_keys_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut action = Map::new();
    copy_field(&src, &mut action, "keys", "keys");
    copy_field(&src, &mut action, "delay", "inputDelay");

    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    step.insert("type".into(), Value::Object(action));
    Value::Object(step)
}

fn save_screenshot_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut action = Map::new();
    copy_field(&src, &mut action, "path", "path");
    copy_field(&src, &mut action, "directory", "directory");
    if let Some(max_variation) = src.get("maxVariation") {
        action.insert("maxVariation".into(), percentage_to_fraction(max_variation));
    }
    if let Some(overwrite) = src.get("overwrite") {
        action.insert("overwrite".into(), remap_overwrite(overwrite));
    }

    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    step.insert("screenshot".into(), Value::Object(action));
    Value::Object(step)
}

fn start_recording_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut action = Map::new();
    copy_field(&src, &mut action, "path", "path");
    copy_field(&src, &mut action, "directory", "directory");
    copy_field(&src, &mut action, "overwrite", "overwrite");

    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    step.insert("record".into(), Value::Object(action));
    Value::Object(step)
}

fn stop_recording_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    step.insert("stopRecord".into(), Value::Bool(true));
    Value::Object(step)
}

/// Bare-number legacy waits map exactly; any other legacy form (object,
/// boolean, missing duration) normalizes to the current default wait.
fn wait_v2_to_step_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut step = Map::new();
    copy_step_common(&src, &mut step);
    let duration = src.get("duration");
    if let Some(n) = duration.filter(|d| d.is_number()) {
        step.insert("wait".into(), n.clone());
    } else {
        step.insert("wait".into(), Value::Bool(true));
    }
    Value::Object(step)
}

// ---------------------------------------------------------------------------
// Container rules
// ---------------------------------------------------------------------------

fn context_v2_to_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut out = Map::new();

    if let Some(app) = src.get("app").and_then(Value::as_object) {
        let mut browser = Map::new();
        if let Some(name) = app.get("name").and_then(Value::as_str) {
            // Legacy Edge contexts run on the Chrome driver.
            let name = if name == "edge" { "chrome" } else { name };
            browser.insert("name".into(), Value::String(name.to_string()));
        }
        if let Some(options) = app.get("options").and_then(Value::as_object) {
            copy_field(options, &mut browser, "headless", "headless");
            let mut window = Map::new();
            copy_field(options, &mut window, "width", "width");
            copy_field(options, &mut window, "height", "height");
            if !window.is_empty() {
                browser.insert("window".into(), Value::Object(window));
            }
            let mut viewport = Map::new();
            copy_field(options, &mut viewport, "viewport_width", "width");
            copy_field(options, &mut viewport, "viewport_height", "height");
            if !viewport.is_empty() {
                browser.insert("viewport".into(), Value::Object(viewport));
            }
        }
        out.insert("browsers".into(), json!([Value::Object(browser)]));
    }
    copy_field(&src, &mut out, "platforms", "platforms");
    Value::Object(out)
}

fn open_api_v2_to_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut out = Map::new();
    copy_field(&src, &mut out, "name", "name");
    copy_field(&src, &mut out, "descriptionPath", "descriptionPath");
    copy_field(&src, &mut out, "operationId", "operationId");
    copy_field(&src, &mut out, "requestHeaders", "headers");
    Value::Object(out)
}

fn transform_each(list: &Value, rule: TransformFn) -> Value {
    match list.as_array() {
        Some(items) => Value::Array(items.iter().map(rule).collect()),
        None => list.clone(),
    }
}

/// Migrate one legacy flat step by its `action` discriminator. Steps with
/// an unknown action pass through unchanged and are caught by the target
/// validation of the enclosing container.
fn migrate_step(step: &Value) -> Value {
    let action = step.get("action").and_then(Value::as_str);
    match action.and_then(step_rule) {
        Some(rule) => rule(step),
        None => step.clone(),
    }
}

fn test_v2_to_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut out = Map::new();
    copy_field(&src, &mut out, "id", "testId");
    copy_field(&src, &mut out, "description", "description");
    copy_field(&src, &mut out, "file", "contentPath");
    copy_field(&src, &mut out, "detectSteps", "detectSteps");
    copy_field(&src, &mut out, "setup", "before");
    copy_field(&src, &mut out, "cleanup", "after");
    if let Some(contexts) = src.get("contexts") {
        out.insert("runOn".into(), transform_each(contexts, context_v2_to_v3));
    }
    if let Some(open_api) = src.get("openApi") {
        out.insert("openApi".into(), transform_each(open_api, open_api_v2_to_v3));
    }
    let steps = match src.get("steps") {
        Some(steps) => transform_each(steps, migrate_step),
        None => json!([]),
    };
    out.insert("steps".into(), steps);
    Value::Object(out)
}

fn spec_v2_to_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut out = Map::new();
    copy_field(&src, &mut out, "id", "specId");
    copy_field(&src, &mut out, "description", "description");
    copy_field(&src, &mut out, "file", "contentPath");
    if let Some(contexts) = src.get("contexts") {
        out.insert("contexts".into(), transform_each(contexts, context_v2_to_v3));
    }
    if let Some(open_api) = src.get("openApi") {
        out.insert("openApi".into(), transform_each(open_api, open_api_v2_to_v3));
    }
    let tests = match src.get("tests") {
        Some(tests) => transform_each(tests, test_v2_to_v3),
        None => json!([]),
    };
    out.insert("tests".into(), tests);
    Value::Object(out)
}

/// Collapse the legacy per-statement fields into the current
/// `inlineStatements` object. Open/close delimiter pairs become one
/// pattern with a lazy capture group between them.
fn file_type_v2_to_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut out = Map::new();
    copy_field(&src, &mut out, "name", "name");
    if let Some(extensions) = src.get("extensions").or_else(|| src.get("extension")) {
        out.insert("extensions".into(), ensure_string_array(extensions));
    }

    let mut inline = Map::new();
    let delimited = |open: &str, close: &str| format!("{open}(.*?){close}");
    if let Some(open) = src.get("testStartStatementOpen").and_then(Value::as_str) {
        let close = src
            .get("testStartStatementClose")
            .and_then(Value::as_str)
            .unwrap_or_default();
        inline.insert("testStart".into(), json!([delimited(open, close)]));
    }
    if let Some(end) = src.get("testEndStatement").and_then(Value::as_str) {
        inline.insert("testEnd".into(), json!([end]));
    }
    if let Some(ignore) = src.get("testIgnoreStatement").and_then(Value::as_str) {
        // The legacy ignore statement is a toggle; it serves as both the
        // start and end pattern in the current generation.
        inline.insert("ignoreStart".into(), json!([ignore]));
        inline.insert("ignoreEnd".into(), json!([ignore]));
    }
    if let Some(open) = src.get("stepStatementOpen").and_then(Value::as_str) {
        let close = src
            .get("stepStatementClose")
            .and_then(Value::as_str)
            .unwrap_or_default();
        inline.insert("step".into(), json!([delimited(open, close)]));
    }
    if !inline.is_empty() {
        out.insert("inlineStatements".into(), Value::Object(inline));
    }

    if let Some(markup) = src.get("markup").and_then(Value::as_array) {
        let migrated: Vec<Value> = markup
            .iter()
            .map(|rule| {
                let rule_src = source_object(rule);
                let mut migrated_rule = Map::new();
                copy_field(&rule_src, &mut migrated_rule, "name", "name");
                if let Some(regex) = rule_src.get("regex") {
                    migrated_rule.insert("regex".into(), ensure_string_array(regex));
                }
                copy_field(&rule_src, &mut migrated_rule, "batchMatches", "batchMatches");
                if let Some(actions) = rule_src.get("actions").and_then(Value::as_array) {
                    let normalized: Vec<Value> =
                        actions.iter().map(normalize_markup_action).collect();
                    migrated_rule.insert("actions".into(), Value::Array(normalized));
                }
                Value::Object(migrated_rule)
            })
            .collect();
        out.insert("markup".into(), Value::Array(migrated));
    }
    Value::Object(out)
}

/// Normalize the legacy markup action shapes — `"name"`,
/// `{action, ...params}`, `{name, params}` — into a uniform
/// `{ <actionName>: {...params} }` object.
fn normalize_markup_action(action: &Value) -> Value {
    let single_key = |name: &str, params: Value| {
        let mut out = Map::new();
        out.insert(name.to_string(), params);
        Value::Object(out)
    };
    match action {
        Value::String(name) => single_key(name, Value::Object(Map::new())),
        Value::Object(map) => {
            if let Some(name) = map.get("action").and_then(Value::as_str) {
                let name = name.to_string();
                let mut params = map.clone();
                params.remove("action");
                return single_key(&name, Value::Object(params));
            }
            if let (Some(name), Some(params)) =
                (map.get("name").and_then(Value::as_str), map.get("params"))
            {
                return single_key(name, params.clone());
            }
            action.clone()
        }
        other => other.clone(),
    }
}

fn config_v2_to_v3(value: &Value) -> Value {
    let src = source_object(value);
    let mut out = Map::new();
    copy_field(&src, &mut out, "input", "input");
    copy_field(&src, &mut out, "output", "output");
    copy_field(&src, &mut out, "recursive", "recursive");
    copy_field(&src, &mut out, "detectSteps", "detectSteps");
    copy_field(&src, &mut out, "logLevel", "logLevel");
    copy_field(&src, &mut out, "origin", "origin");
    copy_field(&src, &mut out, "envVariables", "loadVariables");

    // Legacy execution options hoist to the top level.
    if let Some(run_tests) = src.get("runTests").and_then(Value::as_object) {
        copy_field(run_tests, &mut out, "input", "input");
        copy_field(run_tests, &mut out, "output", "output");
        copy_field(run_tests, &mut out, "recursive", "recursive");
        copy_field(run_tests, &mut out, "detectSteps", "detectSteps");
        copy_field(run_tests, &mut out, "setup", "beforeAny");
        copy_field(run_tests, &mut out, "cleanup", "afterAll");
    }

    if let Some(contexts) = src.get("contexts") {
        out.insert("contexts".into(), transform_each(contexts, context_v2_to_v3));
    }
    if let Some(file_types) = src.get("fileTypes") {
        out.insert(
            "fileTypes".into(),
            transform_each(file_types, file_type_v2_to_v3),
        );
    }
    if let Some(integrations) = src.get("integrations").and_then(Value::as_object) {
        let mut migrated = Map::new();
        if let Some(open_api) = integrations.get("openApi") {
            migrated.insert("openApi".into(), transform_each(open_api, open_api_v2_to_v3));
        }
        if !migrated.is_empty() {
            out.insert("integrations".into(), Value::Object(migrated));
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(current: &str, target: &str, object: Value) -> Result<Value, TransformError> {
        transform_to_schema_key(&TransformRequest {
            current_schema: current,
            target_schema: target,
            object: &object,
        })
    }

    #[test]
    fn test_identity_transform_returns_equal_object() {
        let object = json!({ "goTo": { "url": "https://example.com" }, "stepId": "s1" });
        let result = transform("step_v3", "step_v3", object.clone()).unwrap();
        assert_eq!(result, object);
    }

    #[test]
    fn test_unsupported_pair_fails_closed() {
        let err = transform("config_v3", "step_v3", json!({})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Can't transform from config_v3 to step_v3."
        );
    }

    #[test]
    fn test_invalid_transform_mentions_invalid_object() {
        // A goTo without a url cannot satisfy the target schema.
        let err = transform("goTo_v2", "step_v3", json!({ "action": "goTo" })).unwrap_err();
        assert!(matches!(err, TransformError::Invalid { .. }));
        assert!(err.to_string().contains("Invalid object"));
    }

    #[test]
    fn test_go_to_remap() {
        let result = transform(
            "goTo_v2",
            "step_v3",
            json!({
                "action": "goTo",
                "id": "open",
                "description": "Open the home page.",
                "url": "https://example.com",
                "origin": "https://example.com"
            }),
        )
        .unwrap();
        assert_eq!(result["stepId"], "open");
        assert_eq!(result["description"], "Open the home page.");
        assert_eq!(result["goTo"]["url"], "https://example.com");
        assert_eq!(result["goTo"]["origin"], "https://example.com");
        assert!(result.get("action").is_none());
        assert!(result.get("id").is_none());
    }

    #[test]
    fn test_find_remap_with_variables() {
        let result = transform(
            "find_v2",
            "step_v3",
            json!({
                "action": "find",
                "selector": "#price",
                "matchText": "Total",
                "typeKeys": { "keys": ["$ENTER$"], "delay": 250 },
                "setVariables": [{ "name": "PRICE", "regex": "[0-9.]+" }]
            }),
        )
        .unwrap();
        assert_eq!(result["find"]["selector"], "#price");
        assert_eq!(result["find"]["elementText"], "Total");
        assert_eq!(result["find"]["type"]["keys"][0], "$ENTER$");
        assert_eq!(result["find"]["type"]["inputDelay"], 250);
        assert_eq!(
            result["variables"]["PRICE"],
            "extract($$element.text, \"[0-9.]+\")"
        );
    }

    #[test]
    fn test_check_link_passthrough() {
        let result = transform(
            "checkLink_v2",
            "step_v3",
            json!({ "action": "checkLink", "url": "https://example.com", "statusCodes": [200] }),
        )
        .unwrap();
        assert_eq!(result["checkLink"]["url"], "https://example.com");
        assert_eq!(result["checkLink"]["statusCodes"][0], 200);
    }

    #[test]
    fn test_http_request_full_remap() {
        let result = transform(
            "httpRequest_v2",
            "step_v3",
            json!({
                "action": "httpRequest",
                "url": "https://api.example.com/items",
                "method": "POST",
                "requestData": { "name": "widget" },
                "requestHeaders": { "Content-Type": "application/json" },
                "responseData": { "id": 1 },
                "maxVariation": 10,
                "overwrite": "byVariation",
                "envsFromResponseData": [{ "name": "ITEM_ID", "jqFilter": ".id" }],
                "openApi": {
                    "name": "inventory",
                    "descriptionPath": "openapi.yaml",
                    "operationId": "createItem",
                    "requestHeaders": { "Authorization": "Bearer x" }
                }
            }),
        )
        .unwrap();
        let action = &result["httpRequest"];
        assert_eq!(action["method"], "post");
        assert_eq!(action["request"]["body"]["name"], "widget");
        assert_eq!(action["request"]["headers"]["Content-Type"], "application/json");
        assert_eq!(action["response"]["body"]["id"], 1);
        assert_eq!(action["maxVariation"], 0.1);
        assert_eq!(action["overwrite"], "aboveVariation");
        assert_eq!(action["openApi"]["headers"]["Authorization"], "Bearer x");
        assert!(action["openApi"].get("requestHeaders").is_none());
        assert_eq!(
            result["variables"]["ITEM_ID"],
            "jq($$response.body, \".id\")"
        );
    }

    #[test]
    fn test_run_shell_remap() {
        let result = transform(
            "runShell_v2",
            "step_v3",
            json!({
                "action": "runShell",
                "command": "make",
                "args": ["build"],
                "output": "build.log",
                "maxVariation": 25,
                "overwrite": "byVariation",
                "setVariables": [{ "name": "VERSION", "regex": "v[0-9.]+" }]
            }),
        )
        .unwrap();
        assert_eq!(result["runShell"]["command"], "make");
        assert_eq!(result["runShell"]["stdio"], "build.log");
        assert_eq!(result["runShell"]["maxVariation"], 0.25);
        assert_eq!(result["runShell"]["overwrite"], "aboveVariation");
        assert_eq!(
            result["variables"]["VERSION"],
            "extract($$stdio.stdout, \"v[0-9.]+\")"
        );
    }

    #[test]
    fn test_run_code_remap() {
        let result = transform(
            "runCode_v2",
            "step_v3",
            json!({
                "action": "runCode",
                "language": "python",
                "code": "print('ok')",
                "setVariables": [{ "name": "OUT", "regex": ".*" }]
            }),
        )
        .unwrap();
        assert_eq!(result["runCode"]["language"], "python");
        assert_eq!(result["runCode"]["code"], "print('ok')");
        assert_eq!(result["variables"]["OUT"], "extract($$stdio.stdout, \".*\")");
    }

    #[test]
    fn test_set_variables_becomes_scalar_load_variables() {
        let result = transform(
            "setVariables_v2",
            "step_v3",
            json!({ "action": "setVariables", "path": ".env" }),
        )
        .unwrap();
        assert_eq!(result["loadVariables"], ".env");
    }

    #[test]
    fn test_type_keys_remap() {
        let result = transform(
            "typeKeys_v2",
            "step_v3",
            json!({ "action": "typeKeys", "keys": ["hello"], "delay": 100 }),
        )
        .unwrap();
        assert_eq!(result["type"]["keys"][0], "hello");
        assert_eq!(result["type"]["inputDelay"], 100);
    }

    #[test]
    fn test_save_screenshot_percentage_and_overwrite() {
        let result = transform(
            "saveScreenshot_v2",
            "step_v3",
            json!({
                "action": "saveScreenshot",
                "path": "home.png",
                "maxVariation": 10,
                "overwrite": "byVariation"
            }),
        )
        .unwrap();
        assert_eq!(result["screenshot"]["path"], "home.png");
        assert_eq!(result["screenshot"]["maxVariation"], 0.1);
        assert_eq!(result["screenshot"]["overwrite"], "aboveVariation");
    }

    #[test]
    fn test_overwrite_true_passes_through_literally() {
        let result = transform(
            "saveScreenshot_v2",
            "step_v3",
            json!({ "action": "saveScreenshot", "path": "home.png", "overwrite": "true" }),
        )
        .unwrap();
        assert_eq!(result["screenshot"]["overwrite"], "true");
    }

    #[test]
    fn test_recording_rules() {
        let start = transform(
            "startRecording_v2",
            "step_v3",
            json!({ "action": "startRecording", "path": "demo.mp4" }),
        )
        .unwrap();
        assert_eq!(start["record"]["path"], "demo.mp4");

        let stop = transform(
            "stopRecording_v2",
            "step_v3",
            json!({ "action": "stopRecording", "id": "stop-1" }),
        )
        .unwrap();
        assert_eq!(stop["stopRecord"], true);
        assert_eq!(stop["stepId"], "stop-1");
    }

    #[test]
    fn test_wait_bare_number() {
        let result = transform(
            "wait_v2",
            "step_v3",
            json!({ "action": "wait", "duration": 1000 }),
        )
        .unwrap();
        assert_eq!(result["wait"], 1000);
    }

    #[test]
    fn test_wait_without_duration_defaults() {
        let result = transform("wait_v2", "step_v3", json!({ "action": "wait" })).unwrap();
        assert_eq!(result["wait"], true);
    }

    #[test]
    fn test_context_remap_edge_becomes_chrome() {
        let result = transform(
            "context_v2",
            "context_v3",
            json!({
                "app": {
                    "name": "edge",
                    "options": {
                        "headless": false,
                        "width": 1280,
                        "height": 800,
                        "viewport_width": 1024,
                        "viewport_height": 768
                    }
                },
                "platforms": ["linux", "mac"]
            }),
        )
        .unwrap();
        let browser = &result["browsers"][0];
        assert_eq!(browser["name"], "chrome");
        assert_eq!(browser["headless"], false);
        assert_eq!(browser["window"]["width"], 1280);
        assert_eq!(browser["viewport"]["height"], 768);
        assert_eq!(result["platforms"], json!(["linux", "mac"]));
    }

    #[test]
    fn test_test_remap_recurses_into_steps() {
        let result = transform(
            "test_v2",
            "test_v3",
            json!({
                "id": "checkout",
                "file": "docs/checkout.md",
                "setup": "login.json",
                "cleanup": "logout.json",
                "steps": [
                    { "action": "goTo", "url": "https://example.com" },
                    { "action": "wait", "duration": 500 }
                ]
            }),
        )
        .unwrap();
        assert_eq!(result["testId"], "checkout");
        assert_eq!(result["contentPath"], "docs/checkout.md");
        assert_eq!(result["before"], "login.json");
        assert_eq!(result["after"], "logout.json");
        assert_eq!(result["steps"][0]["goTo"]["url"], "https://example.com");
        assert_eq!(result["steps"][1]["wait"], 500);
    }

    #[test]
    fn test_test_without_steps_gets_empty_array() {
        let result = transform("test_v2", "test_v3", json!({ "id": "skeleton" })).unwrap();
        assert_eq!(result["steps"], json!([]));
    }

    #[test]
    fn test_spec_remap() {
        let result = transform(
            "spec_v2",
            "spec_v3",
            json!({
                "id": "smoke",
                "tests": [{
                    "id": "t1",
                    "steps": [{ "action": "checkLink", "url": "https://example.com" }]
                }]
            }),
        )
        .unwrap();
        assert_eq!(result["specId"], "smoke");
        assert_eq!(result["tests"][0]["testId"], "t1");
        assert_eq!(
            result["tests"][0]["steps"][0]["checkLink"]["url"],
            "https://example.com"
        );
    }

    #[test]
    fn test_config_remap_hoists_run_tests() {
        let result = transform(
            "config_v2",
            "config_v3",
            json!({
                "envVariables": ".env",
                "logLevel": "debug",
                "runTests": {
                    "input": "docs",
                    "output": "results.json",
                    "recursive": true,
                    "detectSteps": true,
                    "setup": "setup.json",
                    "cleanup": "cleanup.json"
                },
                "contexts": [{ "app": { "name": "firefox" } }],
                "fileTypes": [{
                    "name": "markdown",
                    "extensions": ["md"],
                    "testStartStatementOpen": "<!-- test",
                    "testStartStatementClose": "-->",
                    "testEndStatement": "<!-- test end -->",
                    "testIgnoreStatement": "<!-- test ignore -->",
                    "stepStatementOpen": "<!-- step",
                    "stepStatementClose": "-->",
                    "markup": [{
                        "name": "hyperlinks",
                        "regex": "\\[[^\\]]+\\]\\(([^)]+)\\)",
                        "actions": ["checkLink", { "action": "screenshot", "path": "$1" }]
                    }]
                }],
                "integrations": {
                    "openApi": [{ "name": "inventory", "requestHeaders": { "x": "y" } }]
                }
            }),
        )
        .unwrap();
        assert_eq!(result["input"], "docs");
        assert_eq!(result["output"], "results.json");
        assert_eq!(result["recursive"], true);
        assert_eq!(result["detectSteps"], true);
        assert_eq!(result["beforeAny"], "setup.json");
        assert_eq!(result["afterAll"], "cleanup.json");
        assert_eq!(result["loadVariables"], ".env");
        assert!(result.get("runTests").is_none());
        assert_eq!(result["contexts"][0]["browsers"][0]["name"], "firefox");

        let file_type = &result["fileTypes"][0];
        assert_eq!(
            file_type["inlineStatements"]["testStart"][0],
            "<!-- test(.*?)-->"
        );
        assert_eq!(
            file_type["inlineStatements"]["testEnd"][0],
            "<!-- test end -->"
        );
        assert_eq!(
            file_type["inlineStatements"]["ignoreStart"],
            file_type["inlineStatements"]["ignoreEnd"]
        );
        assert_eq!(file_type["markup"][0]["regex"][0], "\\[[^\\]]+\\]\\(([^)]+)\\)");
        assert_eq!(file_type["markup"][0]["actions"][0], json!({ "checkLink": {} }));
        assert_eq!(
            file_type["markup"][0]["actions"][1],
            json!({ "screenshot": { "path": "$1" } })
        );
        assert_eq!(result["integrations"]["openApi"][0]["headers"]["x"], "y");
    }

    #[test]
    fn test_normalize_markup_action_name_params_shape() {
        let normalized =
            normalize_markup_action(&json!({ "name": "goTo", "params": { "url": "$1" } }));
        assert_eq!(normalized, json!({ "goTo": { "url": "$1" } }));
    }

    #[test]
    fn test_registry_pairs_are_unique() {
        for (i, (source, target, _)) in TRANSFORMS.iter().enumerate() {
            for (other_source, other_target, _) in &TRANSFORMS[i + 1..] {
                assert!(
                    !(source == other_source && target == other_target),
                    "duplicate rule for ({source}, {target})"
                );
            }
        }
    }
}
