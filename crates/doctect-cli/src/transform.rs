//! # Transform Subcommand
//!
//! Migrates a document from one schema generation to another through
//! the registered transform rules.

use std::path::PathBuf;

use clap::Args;

use doctect_schema::{transform_to_schema_key, TransformRequest};

use crate::io::{read_document, write_document};

/// Arguments for the transform subcommand.
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Schema key the document currently conforms to, e.g. `test_v2`.
    #[arg(long)]
    pub from: String,

    /// Schema key to rewrite the document into, e.g. `test_v3`.
    #[arg(long)]
    pub to: String,

    /// Document to transform (JSON or YAML).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the transformed document here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &TransformArgs) -> anyhow::Result<()> {
    let document = read_document(&args.input)?;
    let transformed = transform_to_schema_key(&TransformRequest {
        current_schema: &args.from,
        target_schema: &args.to,
        object: &document,
    })?;
    tracing::info!(from = %args.from, to = %args.to, "transform complete");
    write_document(args.output.as_deref(), &transformed)
}
