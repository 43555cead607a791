//! # Schema Registry — Versioned Definition Trees
//!
//! A static mapping from schema key (`<name>_v<generation>`, e.g.
//! `goTo_v2`, `step_v3`) to a JSON-Schema-like definition tree. The
//! registry is built once behind a `LazyLock` and is immutable for the
//! process lifetime.
//!
//! ## Definition Nodes
//!
//! Each node may carry: `type`, `properties`, `items`, `required`,
//! `enum`, `pattern`, `default`, and `anyOf`. `anyOf` is an *ordered*
//! union — membership is resolved by the first variant whose structure
//! fits, so variant order here is load-bearing.
//!
//! ## Generations
//!
//! - `v2` (legacy): steps are flat objects with an `action` discriminator
//!   and action-specific fields at the top level. Containers use `id`,
//!   `file`, `setup`, `cleanup`.
//! - `v3` (current): steps are keyed by a single action name whose value
//!   is either a primitive (simple form) or an object (detailed form).
//!   Containers use `specId`/`testId`, `contentPath`, `before`, `after`.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::{json, Map, Value};

static REGISTRY: LazyLock<HashMap<&'static str, Value>> = LazyLock::new(build_registry);

/// Resolve a schema key to its definition, or `None` if unregistered.
pub fn schema(key: &str) -> Option<&'static Value> {
    REGISTRY.get(key)
}

/// All registered schema keys, sorted.
pub fn schema_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = REGISTRY.keys().copied().collect();
    keys.sort_unstable();
    keys
}

fn build_registry() -> HashMap<&'static str, Value> {
    let mut registry = HashMap::new();

    // Leaf schemas first; containers embed clones of them.
    let step_v3 = step_v3_schema();
    let context_v3 = context_v3_schema();
    let open_api_v3 = open_api_v3_schema();
    let file_type_v3 = file_type_v3_schema();
    let test_v3 = test_v3_schema(&step_v3, &context_v3, &open_api_v3);
    let spec_v3 = spec_v3_schema(&test_v3, &context_v3, &open_api_v3);
    let config_v3 = config_v3_schema(&context_v3, &open_api_v3, &file_type_v3);

    registry.insert("step_v3", step_v3);
    registry.insert("context_v3", context_v3);
    registry.insert("openApi_v3", open_api_v3);
    registry.insert("fileType_v3", file_type_v3);
    registry.insert("test_v3", test_v3);
    registry.insert("spec_v3", spec_v3);
    registry.insert("config_v3", config_v3);

    for (key, value) in v2_schemas() {
        registry.insert(key, value);
    }

    registry
}

// ---------------------------------------------------------------------------
// v3 action sub-schemas
// ---------------------------------------------------------------------------

fn go_to_action() -> Value {
    json!({
        "anyOf": [
            { "type": "string" },
            {
                "type": "object",
                "required": ["url"],
                "properties": {
                    "url": { "type": "string" },
                    "origin": { "type": "string" }
                }
            }
        ]
    })
}

fn find_action() -> Value {
    // An object find targets by selector or by element text; the two
    // variants share the same property set.
    let click = json!({
        "anyOf": [
            { "type": "boolean" },
            { "type": "string", "enum": ["left", "right", "middle"] },
            {
                "type": "object",
                "properties": {
                    "button": {
                        "type": "string",
                        "enum": ["left", "right", "middle"]
                    }
                }
            }
        ]
    });
    let properties = json!({
        "selector": { "type": "string" },
        "elementText": { "type": "string" },
        "timeout": { "type": "integer" },
        "moveTo": { "type": "boolean" },
        "click": click,
        "type": type_action()
    });
    json!({
        "anyOf": [
            { "type": "string" },
            {
                "type": "object",
                "required": ["selector"],
                "properties": properties.clone()
            },
            {
                "type": "object",
                "required": ["elementText"],
                "properties": properties
            }
        ]
    })
}

fn check_link_action() -> Value {
    json!({
        "anyOf": [
            { "type": "string" },
            {
                "type": "object",
                "required": ["url"],
                "properties": {
                    "url": { "type": "string" },
                    "origin": { "type": "string" },
                    "statusCodes": { "type": "array", "items": { "type": "integer" } }
                }
            }
        ]
    })
}

fn http_request_action() -> Value {
    json!({
        "anyOf": [
            { "type": "string" },
            {
                "type": "object",
                "properties": {
                    "url": { "type": "string" },
                    "method": {
                        "type": "string",
                        "enum": ["get", "put", "post", "patch", "delete"],
                        "default": "get"
                    },
                    "statusCodes": { "type": "array", "items": { "type": "integer" } },
                    "request": {
                        "type": "object",
                        "properties": {
                            "body": {},
                            "headers": { "type": "object" },
                            "parameters": { "type": "object" }
                        }
                    },
                    "response": {
                        "type": "object",
                        "properties": {
                            "body": {},
                            "headers": { "type": "object" }
                        }
                    },
                    "timeout": { "type": "integer" },
                    "maxVariation": { "type": "number" },
                    "overwrite": {
                        "type": "string",
                        "enum": ["true", "false", "aboveVariation"]
                    },
                    "path": { "type": "string" },
                    "directory": { "type": "string" },
                    "openApi": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "descriptionPath": { "type": "string" },
                            "operationId": { "type": "string" },
                            "headers": { "type": "object" }
                        }
                    }
                }
            }
        ]
    })
}

fn shell_like_properties() -> Value {
    json!({
        "args": { "type": "array", "items": { "type": "string" } },
        "workingDirectory": { "type": "string" },
        "exitCodes": { "type": "array", "items": { "type": "integer" } },
        "stdio": { "type": "string" },
        "path": { "type": "string" },
        "directory": { "type": "string" },
        "maxVariation": { "type": "number" },
        "overwrite": {
            "type": "string",
            "enum": ["true", "false", "aboveVariation"]
        },
        "timeout": { "type": "integer" }
    })
}

fn run_shell_action() -> Value {
    let mut props = as_map(shell_like_properties());
    props.insert("command".into(), json!({ "type": "string" }));
    json!({
        "anyOf": [
            { "type": "string" },
            {
                "type": "object",
                "required": ["command"],
                "properties": Value::Object(props)
            }
        ]
    })
}

fn run_code_action() -> Value {
    let mut props = as_map(shell_like_properties());
    props.insert(
        "language".into(),
        json!({ "type": "string", "enum": ["python", "bash", "javascript"] }),
    );
    props.insert("code".into(), json!({ "type": "string" }));
    json!({
        "type": "object",
        "required": ["language", "code"],
        "properties": Value::Object(props)
    })
}

fn load_variables_action() -> Value {
    json!({ "type": "string" })
}

fn type_action() -> Value {
    json!({
        "anyOf": [
            { "type": "string" },
            { "type": "array", "items": { "type": "string" } },
            {
                "type": "object",
                "required": ["keys"],
                "properties": {
                    "keys": {
                        "anyOf": [
                            { "type": "string" },
                            { "type": "array", "items": { "type": "string" } }
                        ]
                    },
                    "inputDelay": { "type": "number" }
                }
            }
        ]
    })
}

fn screenshot_action() -> Value {
    json!({
        "anyOf": [
            { "type": "string" },
            { "type": "boolean" },
            {
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "directory": { "type": "string" },
                    "maxVariation": { "type": "number" },
                    "overwrite": {
                        "type": "string",
                        "enum": ["true", "false", "aboveVariation"]
                    }
                }
            }
        ]
    })
}

fn record_action() -> Value {
    json!({
        "anyOf": [
            { "type": "string" },
            { "type": "boolean" },
            {
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "directory": { "type": "string" },
                    "overwrite": {
                        "type": "string",
                        "enum": ["true", "false", "aboveVariation"]
                    }
                }
            }
        ]
    })
}

fn stop_record_action() -> Value {
    json!({ "type": "boolean" })
}

fn wait_action() -> Value {
    json!({
        "anyOf": [
            { "type": "integer" },
            { "type": "boolean" }
        ]
    })
}

fn click_action() -> Value {
    json!({
        "anyOf": [
            { "type": "boolean" },
            { "type": "string", "enum": ["left", "right", "middle"] },
            {
                "type": "object",
                "properties": {
                    "button": { "type": "string", "enum": ["left", "right", "middle"] }
                }
            }
        ]
    })
}

// ---------------------------------------------------------------------------
// v3 containers
// ---------------------------------------------------------------------------

/// Fields every step variant carries alongside its action key.
fn common_step_properties() -> Map<String, Value> {
    as_map(json!({
        "stepId": { "type": "string" },
        "description": { "type": "string" },
        "unsafe": { "type": "boolean" },
        "outputs": { "type": "object" },
        "variables": { "type": "object" },
        "breakpoint": { "type": "boolean" }
    }))
}

/// One `anyOf` variant of `step_v3`: requires the action key, types it,
/// and admits the common step fields.
fn step_variant(action: &str, action_schema: Value) -> Value {
    let mut props = common_step_properties();
    props.insert(action.to_string(), action_schema);
    json!({
        "type": "object",
        "required": [action],
        "properties": Value::Object(props)
    })
}

fn step_v3_schema() -> Value {
    json!({
        "type": "object",
        "anyOf": [
            step_variant("goTo", go_to_action()),
            step_variant("find", find_action()),
            step_variant("checkLink", check_link_action()),
            step_variant("httpRequest", http_request_action()),
            step_variant("runShell", run_shell_action()),
            step_variant("runCode", run_code_action()),
            step_variant("loadVariables", load_variables_action()),
            step_variant("type", type_action()),
            step_variant("screenshot", screenshot_action()),
            step_variant("record", record_action()),
            step_variant("stopRecord", stop_record_action()),
            step_variant("wait", wait_action()),
            step_variant("click", click_action()),
        ]
    })
}

fn context_v3_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "browsers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {
                            "type": "string",
                            "enum": ["chrome", "firefox", "safari", "webkit"]
                        },
                        "headless": { "type": "boolean", "default": true },
                        "window": {
                            "type": "object",
                            "properties": {
                                "width": { "type": "integer" },
                                "height": { "type": "integer" }
                            }
                        },
                        "viewport": {
                            "type": "object",
                            "properties": {
                                "width": { "type": "integer" },
                                "height": { "type": "integer" }
                            }
                        }
                    }
                }
            },
            "platforms": {
                "type": "array",
                "items": { "type": "string", "enum": ["linux", "mac", "windows"] }
            }
        }
    })
}

fn open_api_v3_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": { "type": "string" },
            "descriptionPath": { "type": "string" },
            "operationId": { "type": "string" },
            "headers": { "type": "object" }
        }
    })
}

fn regex_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn file_type_v3_schema() -> Value {
    json!({
        "type": "object",
        "required": ["extensions"],
        "properties": {
            "name": { "type": "string" },
            "extensions": {
                "type": "array",
                "items": { "type": "string", "pattern": "^[A-Za-z0-9]+$" }
            },
            "inlineStatements": {
                "type": "object",
                "properties": {
                    "testStart": regex_list(),
                    "testEnd": regex_list(),
                    "ignoreStart": regex_list(),
                    "ignoreEnd": regex_list(),
                    "step": regex_list()
                }
            },
            "markup": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["regex"],
                    "properties": {
                        "name": { "type": "string" },
                        "regex": regex_list(),
                        "actions": { "type": "array" },
                        "batchMatches": { "type": "boolean" }
                    }
                }
            }
        }
    })
}

fn test_v3_schema(step_v3: &Value, context_v3: &Value, open_api_v3: &Value) -> Value {
    json!({
        "type": "object",
        "required": ["steps"],
        "properties": {
            "testId": { "type": "string" },
            "description": { "type": "string" },
            "contentPath": { "type": "string" },
            "detectSteps": { "type": "boolean" },
            "runOn": { "type": "array", "items": context_v3.clone() },
            "openApi": { "type": "array", "items": open_api_v3.clone() },
            "before": { "type": "string" },
            "after": { "type": "string" },
            "steps": { "type": "array", "items": step_v3.clone() }
        }
    })
}

fn spec_v3_schema(test_v3: &Value, context_v3: &Value, open_api_v3: &Value) -> Value {
    json!({
        "type": "object",
        "required": ["tests"],
        "properties": {
            "specId": { "type": "string" },
            "description": { "type": "string" },
            "contentPath": { "type": "string" },
            "contexts": { "type": "array", "items": context_v3.clone() },
            "openApi": { "type": "array", "items": open_api_v3.clone() },
            "tests": { "type": "array", "items": test_v3.clone() }
        }
    })
}

fn config_v3_schema(context_v3: &Value, open_api_v3: &Value, file_type_v3: &Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "input": {
                "anyOf": [
                    { "type": "string" },
                    { "type": "array", "items": { "type": "string" } }
                ]
            },
            "output": { "type": "string" },
            "recursive": { "type": "boolean" },
            "detectSteps": { "type": "boolean" },
            "logLevel": {
                "type": "string",
                "enum": ["silent", "error", "warning", "info", "debug"],
                "default": "info"
            },
            "beforeAny": { "type": "string" },
            "afterAll": { "type": "string" },
            "loadVariables": { "type": "string" },
            "origin": { "type": "string" },
            "contexts": { "type": "array", "items": context_v3.clone() },
            "fileTypes": { "type": "array", "items": file_type_v3.clone() },
            "integrations": {
                "type": "object",
                "properties": {
                    "openApi": { "type": "array", "items": open_api_v3.clone() }
                }
            },
            "_herettoPathMapping": { "type": "object" }
        }
    })
}

// ---------------------------------------------------------------------------
// v2 (legacy) schemas
// ---------------------------------------------------------------------------

/// A legacy step schema: flat object with an `action` discriminator and
/// action-specific fields at the top level.
fn v2_step_schema(action: &str, specific: Value) -> Value {
    let mut props = as_map(json!({
        "action": { "type": "string", "enum": [action] },
        "id": { "type": "string" },
        "description": { "type": "string" }
    }));
    for (key, value) in as_map(specific) {
        props.insert(key, value);
    }
    json!({
        "type": "object",
        "required": ["action"],
        "properties": Value::Object(props)
    })
}

fn set_variables_list() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "required": ["name", "regex"],
            "properties": {
                "name": { "type": "string" },
                "regex": { "type": "string" }
            }
        }
    })
}

fn v2_schemas() -> Vec<(&'static str, Value)> {
    let shell_specific = json!({
        "command": { "type": "string" },
        "args": { "type": "array", "items": { "type": "string" } },
        "workingDirectory": { "type": "string" },
        "exitCodes": { "type": "array", "items": { "type": "integer" } },
        "output": { "type": "string" },
        "timeout": { "type": "integer" },
        "maxVariation": { "type": "number" },
        "overwrite": { "type": "string" },
        "setVariables": set_variables_list()
    });
    let mut run_code_specific = as_map(shell_specific.clone());
    run_code_specific.insert("language".into(), json!({ "type": "string" }));
    run_code_specific.insert("code".into(), json!({ "type": "string" }));

    vec![
        (
            "goTo_v2",
            v2_step_schema(
                "goTo",
                json!({
                    "url": { "type": "string" },
                    "origin": { "type": "string" }
                }),
            ),
        ),
        (
            "find_v2",
            v2_step_schema(
                "find",
                json!({
                    "selector": { "type": "string" },
                    "timeout": { "type": "integer" },
                    "matchText": { "type": "string" },
                    "moveTo": { "type": "boolean" },
                    "click": { "type": "boolean" },
                    "typeKeys": {
                        "type": "object",
                        "properties": {
                            "keys": {},
                            "delay": { "type": "number" }
                        }
                    },
                    "setVariables": set_variables_list()
                }),
            ),
        ),
        (
            "checkLink_v2",
            v2_step_schema(
                "checkLink",
                json!({
                    "url": { "type": "string" },
                    "statusCodes": { "type": "array", "items": { "type": "integer" } }
                }),
            ),
        ),
        (
            "httpRequest_v2",
            v2_step_schema(
                "httpRequest",
                json!({
                    "url": { "type": "string" },
                    "method": { "type": "string" },
                    "statusCodes": { "type": "array", "items": { "type": "integer" } },
                    "requestData": {},
                    "requestHeaders": { "type": "object" },
                    "requestParams": { "type": "object" },
                    "responseData": {},
                    "responseHeaders": { "type": "object" },
                    "timeout": { "type": "integer" },
                    "maxVariation": { "type": "number" },
                    "overwrite": { "type": "string" },
                    "envsFromResponseData": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["name", "jqFilter"],
                            "properties": {
                                "name": { "type": "string" },
                                "jqFilter": { "type": "string" }
                            }
                        }
                    },
                    "openApi": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "descriptionPath": { "type": "string" },
                            "operationId": { "type": "string" },
                            "requestHeaders": { "type": "object" }
                        }
                    }
                }),
            ),
        ),
        ("runShell_v2", v2_step_schema("runShell", shell_specific)),
        (
            "runCode_v2",
            v2_step_schema("runCode", Value::Object(run_code_specific)),
        ),
        (
            "setVariables_v2",
            v2_step_schema("setVariables", json!({ "path": { "type": "string" } })),
        ),
        (
            "typeKeys_v2",
            v2_step_schema(
                "typeKeys",
                json!({
                    "keys": {},
                    "delay": { "type": "number" }
                }),
            ),
        ),
        (
            "saveScreenshot_v2",
            v2_step_schema(
                "saveScreenshot",
                json!({
                    "path": { "type": "string" },
                    "directory": { "type": "string" },
                    "maxVariation": { "type": "number" },
                    "overwrite": { "type": "string" }
                }),
            ),
        ),
        (
            "startRecording_v2",
            v2_step_schema(
                "startRecording",
                json!({
                    "path": { "type": "string" },
                    "directory": { "type": "string" },
                    "overwrite": { "type": "string" }
                }),
            ),
        ),
        ("stopRecording_v2", v2_step_schema("stopRecording", json!({}))),
        (
            "wait_v2",
            v2_step_schema("wait", json!({ "duration": { "type": "integer" } })),
        ),
        (
            "context_v2",
            json!({
                "type": "object",
                "properties": {
                    "app": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": { "type": "string" },
                            "options": {
                                "type": "object",
                                "properties": {
                                    "headless": { "type": "boolean" },
                                    "width": { "type": "integer" },
                                    "height": { "type": "integer" },
                                    "viewport_width": { "type": "integer" },
                                    "viewport_height": { "type": "integer" }
                                }
                            }
                        }
                    },
                    "platforms": {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                }
            }),
        ),
        (
            "openApi_v2",
            json!({
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "descriptionPath": { "type": "string" },
                    "operationId": { "type": "string" },
                    "requestHeaders": { "type": "object" }
                }
            }),
        ),
        (
            "test_v2",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "description": { "type": "string" },
                    "file": { "type": "string" },
                    "detectSteps": { "type": "boolean" },
                    "setup": { "type": "string" },
                    "cleanup": { "type": "string" },
                    "contexts": { "type": "array" },
                    "openApi": { "type": "array" },
                    "steps": {
                        "type": "array",
                        "items": { "type": "object", "required": ["action"] }
                    }
                }
            }),
        ),
        (
            "spec_v2",
            json!({
                "type": "object",
                "required": ["tests"],
                "properties": {
                    "id": { "type": "string" },
                    "description": { "type": "string" },
                    "contexts": { "type": "array" },
                    "openApi": { "type": "array" },
                    "tests": { "type": "array" }
                }
            }),
        ),
        (
            "config_v2",
            json!({
                "type": "object",
                "properties": {
                    "input": {},
                    "output": { "type": "string" },
                    "recursive": { "type": "boolean" },
                    "logLevel": { "type": "string" },
                    "envVariables": { "type": "string" },
                    "runTests": { "type": "object" },
                    "contexts": { "type": "array" },
                    "fileTypes": { "type": "array" },
                    "integrations": { "type": "object" }
                }
            }),
        ),
    ]
}

fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        // Only called on object literals defined in this module.
        _ => Map::new(),
    }
}
