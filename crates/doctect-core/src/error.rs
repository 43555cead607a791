//! # Error Types — Shared Error Hierarchy
//!
//! Errors shared across the doctect workspace. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Caller precondition violations (`InputError`) fail loudly and are
//!   never recovered internally.
//! - Data-quality problems (an object that fails validation, a schema key
//!   that does not resolve) are *reported results*, not errors — they are
//!   modeled as failure-carrying return values in `doctect-schema` so that
//!   callers decide policy.

use thiserror::Error;

/// A caller violated a precondition of an API entry point.
///
/// These are programming errors on the caller's side, not data errors:
/// they are returned as `Err` and never recovered internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// A schema key argument was empty or missing.
    #[error("Schema key is required.")]
    SchemaKeyRequired,

    /// An object argument was null or missing.
    #[error("Object is required.")]
    ObjectRequired,
}
