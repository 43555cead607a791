//! # doctect-schema — Versioned Schemas, Validation, and Transformation
//!
//! Test objects in doctect are user-authored JSON/YAML values that conform
//! to one of two schema generations: the legacy generation (`v2`, flat
//! `action`-discriminated steps) and the current generation (`v3`, steps
//! keyed by a single action name). This crate owns everything about those
//! generations:
//!
//! - [`registry`] — the static map from schema key (`goTo_v2`, `step_v3`,
//!   ...) to a JSON-Schema-like definition tree, built once per process.
//! - [`validate`] — structural validation with optional default-value
//!   coercion. Never mutates the caller's object; operates on a deep clone.
//! - [`transform`] — the v2→v3 migration engine: an explicit registry of
//!   `(source, target)` rule functions, each a pure remapping whose output
//!   is validated against the target schema before it is returned.
//!
//! ## Crate Policy
//!
//! - Validation failures and unknown schema keys are *reported results*
//!   (`valid: false`), never errors — callers decide policy.
//! - Transformation failures are errors: an unregistered pair or a rule
//!   that produces an invalid object signals a bug or unrecoverable data.
//! - No I/O. Schemas are compiled in; documents arrive as
//!   `serde_json::Value`.

pub mod registry;
pub mod transform;
pub mod validate;

pub use registry::{schema, schema_keys};
pub use transform::{transform_to_schema_key, TransformError, TransformRequest};
pub use validate::{validate, Validation, ValidationRequest};
