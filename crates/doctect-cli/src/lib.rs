//! # doctect-cli — Documentation Testing Command-Line Interface
//!
//! ## Subcommands
//!
//! - `detect` — Scan documentation files and emit detected tests
//! - `validate` — Validate a document against a registered schema key
//! - `transform` — Migrate a document between schema generations
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to domain crates — no business logic here.
//! - All document I/O accepts both JSON and YAML input.

pub mod config;
pub mod detect;
pub mod io;
pub mod transform;
pub mod validate;
