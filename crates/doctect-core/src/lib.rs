//! # doctect-core — Foundational Types for doctect
//!
//! This crate is the bedrock of the doctect workspace. Every other crate
//! depends on `doctect-core`; it depends on nothing internal.
//!
//! ## Contents
//!
//! - [`error`] — the shared error hierarchy (`InputError` for caller
//!   precondition violations).
//! - [`logging`] — the five ordered log severities
//!   (`silent < error < warning < info < debug`) and the severity-gated
//!   [`logging::log`] helper that bridges config-driven levels onto
//!   `tracing` channels.
//! - [`value`] — conversion from `serde_yaml::Value` to
//!   `serde_json::Value`. All user-authored objects (steps, tests, specs,
//!   configs) are represented as `serde_json::Value` trees throughout the
//!   workspace.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `doctect-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod logging;
pub mod value;

pub use error::InputError;
pub use logging::{log, LogLevel};
pub use value::yaml_to_json;
