//! # Test Detection — Regex-Driven State Machine
//!
//! Scans content top-to-bottom with three states: outside a test, inside
//! a test, and inside an ignore block. Inline statements drive the
//! transitions; markup rules run against the full content and their
//! derived steps are merged into whichever test spans the match.
//!
//! Ignore blocks suppress inline and markup *steps* but deliberately do
//! not suppress test start/end parsing — the test skeleton is still
//! assembled, only its detected content is dropped.
//!
//! Every candidate object passes the same filter: legacy (v2) shapes are
//! migrated via `doctect-schema`, then validated against `step_v3` /
//! `test_v3`. Invalid candidates are dropped quietly; parsing never
//! aborts on bad input.

use regex::Regex;
use serde_json::{json, Map, Value};

use doctect_core::{log, LogLevel};
use doctect_schema::{transform_to_schema_key, validate, TransformRequest, ValidationRequest};

use crate::filetype::{Config, FileType, MarkupRule};
use crate::statements::{parse_object, replace_numeric_variables};

/// Parse documentation content into `test_v3` objects.
///
/// Tests with no valid steps, and candidates that fail `test_v3`
/// validation, are dropped. Never fails: malformed rules and statements
/// degrade to fewer detected tests.
pub fn parse_content(
    config: &Config,
    content: &str,
    file_path: &str,
    file_type: &FileType,
) -> Vec<Value> {
    let mut events = scan_inline_statements(config, content, file_type);
    if config.detect_steps {
        events.extend(scan_markup(config, content, file_path, file_type));
    }
    // Stable sort: same-offset events keep statement-before-markup order
    // and markup rule/action order.
    events.sort_by_key(|event| (event.offset, event.priority()));

    assemble_tests(config, events, file_path)
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Event {
    TestStart(Option<Value>),
    TestEnd,
    IgnoreStart,
    IgnoreEnd,
    InlineStep(Value),
    MarkupStep(Value),
}

#[derive(Debug)]
struct Positioned {
    offset: usize,
    event: Event,
}

impl Positioned {
    fn priority(&self) -> u8 {
        match self.event {
            Event::IgnoreEnd => 0,
            Event::IgnoreStart => 1,
            Event::TestEnd => 2,
            Event::TestStart(_) => 3,
            Event::InlineStep(_) => 4,
            Event::MarkupStep(_) => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Inline statement scan
// ---------------------------------------------------------------------------

/// Compile a pattern list, skipping malformed patterns with a warning so
/// one bad rule never aborts the scan.
fn compile_patterns(patterns: &[String], log_level: LogLevel, kind: &str) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                log(
                    log_level,
                    LogLevel::Warning,
                    &format!("Skipping malformed {kind} pattern {pattern:?}: {e}"),
                );
                None
            }
        })
        .collect()
}

fn scan_inline_statements(config: &Config, content: &str, file_type: &FileType) -> Vec<Positioned> {
    let statements = &file_type.inline_statements;
    let level = config.log_level;
    let test_start = compile_patterns(&statements.test_start, level, "testStart");
    let test_end = compile_patterns(&statements.test_end, level, "testEnd");
    let ignore_start = compile_patterns(&statements.ignore_start, level, "ignoreStart");
    let ignore_end = compile_patterns(&statements.ignore_end, level, "ignoreEnd");
    let step = compile_patterns(&statements.step, level, "step");

    let mut events = Vec::new();
    let mut offset = 0;
    // Local toggle so that an identical start/end pattern (a legacy
    // single-statement toggle) alternates correctly.
    let mut ignoring = false;

    for line in content.split_inclusive('\n') {
        let text = line.trim_end_matches(['\n', '\r']);
        let at = offset;
        offset += line.len();
        if text.is_empty() {
            continue;
        }

        if ignoring && ignore_end.iter().any(|re| re.is_match(text)) {
            ignoring = false;
            events.push(Positioned { offset: at, event: Event::IgnoreEnd });
            continue;
        }
        if !ignoring && ignore_start.iter().any(|re| re.is_match(text)) {
            ignoring = true;
            events.push(Positioned { offset: at, event: Event::IgnoreStart });
            continue;
        }
        if test_end.iter().any(|re| re.is_match(text)) {
            events.push(Positioned { offset: at, event: Event::TestEnd });
            continue;
        }
        if let Some(caps) = test_start.iter().find_map(|re| re.captures(text)) {
            let parsed = caps
                .get(1)
                .map(|m| m.as_str())
                .and_then(parse_object);
            events.push(Positioned { offset: at, event: Event::TestStart(parsed) });
            continue;
        }
        if let Some(caps) = step.iter().find_map(|re| re.captures(text)) {
            let body = caps
                .get(1)
                .or_else(|| caps.get(0))
                .map_or("", |m| m.as_str());
            match parse_object(body) {
                Some(parsed) => {
                    events.push(Positioned { offset: at, event: Event::InlineStep(parsed) });
                }
                None => log(
                    level,
                    LogLevel::Debug,
                    &format!("Dropping unparsable step statement: {body:?}"),
                ),
            }
        }
    }
    events
}

// ---------------------------------------------------------------------------
// Markup scan
// ---------------------------------------------------------------------------

fn scan_markup(
    config: &Config,
    content: &str,
    file_path: &str,
    file_type: &FileType,
) -> Vec<Positioned> {
    let mut events = Vec::new();
    for rule in &file_type.markup {
        let regexes = compile_patterns(&rule.regex, config.log_level, "markup");
        let mut matches: Vec<(usize, Map<String, Value>)> = Vec::new();
        for re in &regexes {
            for caps in re.captures_iter(content) {
                let whole = match caps.get(0) {
                    Some(m) => m,
                    None => continue,
                };
                let mut values = Map::new();
                values.insert("0".to_string(), Value::String(whole.as_str().to_string()));
                for index in 1..caps.len() {
                    if let Some(group) = caps.get(index) {
                        values.insert(index.to_string(), Value::String(group.as_str().to_string()));
                    }
                }
                matches.push((whole.start(), values));
            }
        }
        if matches.is_empty() {
            continue;
        }
        let selected = if rule.batch_matches {
            vec![aggregate_matches(matches)]
        } else {
            matches
        };
        for (offset, values) in selected {
            for action in &rule.actions {
                if let Some(step) = build_markup_step(config, rule, action, &values, file_path) {
                    events.push(Positioned { offset, event: Event::MarkupStep(step) });
                }
            }
        }
    }
    events
}

/// Batch mode: one derived statement per rule. Each capture group's
/// values across all matches are joined with newlines, positioned at the
/// first match.
fn aggregate_matches(matches: Vec<(usize, Map<String, Value>)>) -> (usize, Map<String, Value>) {
    let offset = matches.first().map_or(0, |(at, _)| *at);
    let mut joined: Map<String, Value> = Map::new();
    for (_, values) in &matches {
        for (key, value) in values {
            let text = value.as_str().unwrap_or_default();
            match joined.get_mut(key) {
                Some(Value::String(existing)) => {
                    existing.push('\n');
                    existing.push_str(text);
                }
                _ => {
                    joined.insert(key.clone(), Value::String(text.to_string()));
                }
            }
        }
    }
    (offset, joined)
}

/// Built-in templates for string-named markup actions. `$1` is the first
/// capture group of the rule's regex.
fn simple_action_template(name: &str) -> Option<Value> {
    let template = match name {
        "goTo" => json!({ "goTo": { "url": "$1" } }),
        "checkLink" => json!({ "checkLink": { "url": "$1" } }),
        "find" => json!({ "find": "$1" }),
        "click" => json!({ "find": { "elementText": "$1", "click": true } }),
        "type" | "typeKeys" => json!({ "type": "$1" }),
        "screenshot" | "saveScreenshot" => json!({ "screenshot": { "path": "$1" } }),
        "httpRequest" => json!({ "httpRequest": { "url": "$1" } }),
        "runShell" => json!({ "runShell": { "command": "$1" } }),
        "wait" => json!({ "wait": true }),
        _ => return None,
    };
    Some(template)
}

/// Resolve one markup action template into a candidate step. `None`
/// drops the action: unknown template names, unresolved placeholders,
/// and `runCode` actions (never safe to synthesize from prose).
fn build_markup_step(
    config: &Config,
    rule: &MarkupRule,
    action: &Value,
    values: &Map<String, Value>,
    file_path: &str,
) -> Option<Value> {
    let template = match action {
        Value::String(name) => {
            if name == "runCode" {
                return None;
            }
            match simple_action_template(name) {
                Some(template) => template,
                None => {
                    log(
                        config.log_level,
                        LogLevel::Debug,
                        &format!(
                            "Markup rule {:?} names unknown action template {name:?}",
                            rule.name
                        ),
                    );
                    return None;
                }
            }
        }
        Value::Object(map) => {
            // A normalized-but-parameterless action falls back to the
            // built-in template for that name.
            if map.len() == 1 {
                let (name, params) = map.iter().next()?;
                if params.as_object().is_some_and(Map::is_empty) {
                    if let Some(template) = simple_action_template(name) {
                        template
                    } else {
                        action.clone()
                    }
                } else {
                    action.clone()
                }
            } else {
                action.clone()
            }
        }
        _ => return None,
    };

    let substituted = replace_numeric_variables(&template, &Value::Object(values.clone()))
        .ok()
        .flatten()?;
    let mut step = substituted;
    if step.get("runCode").is_some()
        || step.get("action").and_then(Value::as_str) == Some("runCode")
    {
        return None;
    }

    apply_origin(&mut step, config);
    fix_http_request(&mut step);
    attach_source_integration(&mut step, config, file_path);
    Some(step)
}

/// Relative detected URLs inherit the configured origin.
fn apply_origin(step: &mut Value, config: &Config) {
    let Some(origin) = config.origin.as_deref() else {
        return;
    };
    if let Some(go_to) = step.get_mut("goTo").and_then(Value::as_object_mut) {
        if !go_to.contains_key("origin") {
            go_to.insert("origin".to_string(), Value::String(origin.to_string()));
        }
    }
}

/// Markup-derived `httpRequest` steps may carry raw text blobs: a header
/// block is split line-by-line on the first `:` (colon-less lines and
/// empty values are skipped), and a `{`/`[`-prefixed body string is
/// parsed as JSON, silently left raw when parsing fails.
fn fix_http_request(step: &mut Value) {
    let Some(request) = step
        .get_mut("httpRequest")
        .and_then(|action| action.get_mut("request"))
    else {
        return;
    };

    if let Some(headers_blob) = request.get("headers").and_then(Value::as_str) {
        let mut headers = Map::new();
        for line in headers_blob.lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            headers.insert(name.trim().to_string(), Value::String(value.to_string()));
        }
        request["headers"] = Value::Object(headers);
    }

    if let Some(body_blob) = request.get("body").and_then(Value::as_str) {
        let trimmed = body_blob.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(parsed) = serde_json::from_str::<Value>(body_blob) {
                request["body"] = parsed;
            }
        }
    }
}

/// Screenshots sourced from CMS-managed files get upload metadata so the
/// reporter can push changed images back.
fn attach_source_integration(step: &mut Value, config: &Config, file_path: &str) {
    if step.get("screenshot").is_none() || config.heretto_path_mapping.is_empty() {
        return;
    }
    let normalized = file_path.replace('\\', "/");
    for (prefix, integration_name) in &config.heretto_path_mapping {
        let prefix_normalized = prefix.replace('\\', "/");
        if normalized.starts_with(&prefix_normalized) {
            let content_path = normalized[prefix_normalized.len()..]
                .trim_start_matches('/')
                .to_string();
            if let Some(object) = step.as_object_mut() {
                object.insert(
                    "sourceIntegration".to_string(),
                    json!({
                        "type": "heretto",
                        "integrationName": integration_name,
                        "filePath": file_path,
                        "contentPath": content_path
                    }),
                );
            }
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn assemble_tests(config: &Config, events: Vec<Positioned>, file_path: &str) -> Vec<Value> {
    let mut tests: Vec<Value> = Vec::new();
    let mut current: Option<usize> = None;
    let mut inside_ignore = false;
    let mut assigned_ids = 0usize;

    for positioned in events {
        match positioned.event {
            Event::IgnoreStart => inside_ignore = true,
            Event::IgnoreEnd => inside_ignore = false,
            Event::TestEnd => current = None,
            Event::TestStart(parsed) => {
                let test = seed_test(config, parsed, file_path, &mut assigned_ids);
                tests.push(test);
                current = Some(tests.len() - 1);
            }
            Event::InlineStep(raw) => {
                if inside_ignore {
                    continue;
                }
                if let Some(step) = prepare_step(config, raw) {
                    let index = ensure_current_test(
                        config,
                        &mut tests,
                        &mut current,
                        file_path,
                        &mut assigned_ids,
                    );
                    push_step(&mut tests[index], step);
                }
            }
            Event::MarkupStep(candidate) => {
                if inside_ignore {
                    continue;
                }
                // A test may opt out of markup detection even when the
                // config enables it.
                if let Some(index) = current {
                    if !detect_steps_enabled(&tests[index]) {
                        continue;
                    }
                }
                if let Some(step) = prepare_step(config, candidate) {
                    let index = ensure_current_test(
                        config,
                        &mut tests,
                        &mut current,
                        file_path,
                        &mut assigned_ids,
                    );
                    push_step(&mut tests[index], step);
                }
            }
        }
    }

    finalize_tests(config, tests)
}

/// Build a test skeleton from a parsed `testStart` body. Legacy bodies
/// (an `id` field marks the old generation) migrate immediately; a body
/// that cannot migrate degrades to an empty skeleton.
fn seed_test(
    config: &Config,
    parsed: Option<Value>,
    file_path: &str,
    assigned_ids: &mut usize,
) -> Value {
    let mut test = match parsed {
        Some(value @ Value::Object(_)) => {
            let mut candidate = value;
            coerce_detect_steps(&mut candidate);
            if candidate.get("id").is_some() {
                match transform_to_schema_key(&TransformRequest {
                    current_schema: "test_v2",
                    target_schema: "test_v3",
                    object: &candidate,
                }) {
                    Ok(migrated) => migrated,
                    Err(e) => {
                        log(
                            config.log_level,
                            LogLevel::Warning,
                            &format!("Could not migrate legacy test statement: {e}"),
                        );
                        json!({})
                    }
                }
            } else {
                candidate
            }
        }
        _ => json!({}),
    };

    if let Some(object) = test.as_object_mut() {
        if !object.get("steps").is_some_and(Value::is_array) {
            object.insert("steps".to_string(), json!([]));
        }
        if !object.contains_key("testId") {
            object.insert(
                "testId".to_string(),
                Value::String(next_test_id(file_path, assigned_ids)),
            );
        }
        if !object.contains_key("contentPath") {
            object.insert("contentPath".to_string(), Value::String(file_path.to_string()));
        }
    }
    test
}

fn next_test_id(file_path: &str, assigned_ids: &mut usize) -> String {
    let id = format!("{file_path}_{assigned_ids}");
    *assigned_ids += 1;
    id
}

/// Statement attributes arrive as strings; `detectSteps="false"` means
/// the boolean, not the word.
fn coerce_detect_steps(test: &mut Value) {
    let Some(object) = test.as_object_mut() else {
        return;
    };
    if let Some(Value::String(s)) = object.get("detectSteps") {
        match s.as_str() {
            "true" => {
                object.insert("detectSteps".to_string(), Value::Bool(true));
            }
            "false" => {
                object.insert("detectSteps".to_string(), Value::Bool(false));
            }
            _ => {}
        }
    }
}

fn detect_steps_enabled(test: &Value) -> bool {
    test.get("detectSteps").and_then(Value::as_bool) != Some(false)
}

fn ensure_current_test(
    config: &Config,
    tests: &mut Vec<Value>,
    current: &mut Option<usize>,
    file_path: &str,
    assigned_ids: &mut usize,
) -> usize {
    if let Some(index) = *current {
        return index;
    }
    let test = seed_test(config, None, file_path, assigned_ids);
    tests.push(test);
    let index = tests.len() - 1;
    *current = Some(index);
    index
}

fn push_step(test: &mut Value, step: Value) {
    if let Some(steps) = test.get_mut("steps").and_then(Value::as_array_mut) {
        steps.push(step);
    }
}

/// Normalize one candidate step: migrate legacy flat shapes, then apply
/// the `step_v3` validation filter with defaults. `None` drops the step.
fn prepare_step(config: &Config, raw: Value) -> Option<Value> {
    if let Some(action) = raw.get("action").and_then(Value::as_str) {
        let source_key = format!("{action}_v2");
        return match transform_to_schema_key(&TransformRequest {
            current_schema: &source_key,
            target_schema: "step_v3",
            object: &raw,
        }) {
            Ok(step) => Some(step),
            Err(e) => {
                log(
                    config.log_level,
                    LogLevel::Debug,
                    &format!("Dropping legacy step that failed migration: {e}"),
                );
                None
            }
        };
    }

    match validate(&ValidationRequest {
        schema_key: "step_v3",
        object: &raw,
        add_defaults: true,
    }) {
        Ok(validation) if validation.valid => Some(validation.object),
        Ok(validation) => {
            log(
                config.log_level,
                LogLevel::Debug,
                &format!("Dropping invalid step:\n{}", validation.errors),
            );
            None
        }
        Err(e) => {
            log(
                config.log_level,
                LogLevel::Debug,
                &format!("Dropping step: {e}"),
            );
            None
        }
    }
}

/// Keep every assembled test whose steps survived as a non-empty array
/// and that validates as `test_v3`.
fn finalize_tests(config: &Config, tests: Vec<Value>) -> Vec<Value> {
    tests
        .into_iter()
        .filter_map(|test| {
            let has_steps = test
                .get("steps")
                .and_then(Value::as_array)
                .is_some_and(|steps| !steps.is_empty());
            if !has_steps {
                return None;
            }
            match validate(&ValidationRequest {
                schema_key: "test_v3",
                object: &test,
                add_defaults: true,
            }) {
                Ok(validation) if validation.valid => Some(validation.object),
                Ok(validation) => {
                    log(
                        config.log_level,
                        LogLevel::Warning,
                        &format!("Dropping invalid detected test:\n{}", validation.errors),
                    );
                    None
                }
                Err(_) => None,
            }
        })
        .collect()
}
