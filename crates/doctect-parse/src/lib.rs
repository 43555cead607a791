//! # doctect-parse — Documentation Content Parsing
//!
//! Scans documentation source text for embedded tests. Two detection
//! channels feed one assembly pipeline:
//!
//! 1. **Inline statements** — author-written delimiters (e.g. HTML
//!    comments) that open/close tests, declare steps, and toggle ignore
//!    blocks. Driven by the `inlineStatements` patterns of a
//!    [`FileType`].
//! 2. **Markup rules** — regex-plus-action-template rules that infer
//!    steps from ordinary prose (a Markdown link becomes a `checkLink`,
//!    an image becomes a `screenshot`).
//!
//! Candidate objects may be authored against the legacy (v2) schema
//! generation; they are migrated through `doctect-schema` before the
//! `step_v3`/`test_v3` validation filter decides what is kept.
//!
//! ## Best-Effort Contract
//!
//! This parser scans human-authored, possibly malformed text. Malformed
//! regexes, unparsable statement bodies, substitution gaps, and
//! schema-invalid steps each skip only the offending unit — parsing
//! never aborts, it degrades to "fewer detected steps".

pub mod detect;
pub mod filetype;
pub mod statements;

pub use detect::parse_content;
pub use filetype::{Config, FileType, InlineStatements, MarkupRule};
pub use statements::{
    parse_object, parse_xml_attributes, replace_numeric_variables, SubstitutionError,
};
