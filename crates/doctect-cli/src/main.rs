//! # doctect CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::path::PathBuf;

use clap::Parser;

use doctect_cli::config::{load_config, LoadedConfig};
use doctect_core::LogLevel;

/// doctect — documentation testing toolkit.
///
/// Detects tests embedded in documentation source files, validates
/// objects against registered schemas, and migrates objects between
/// schema generations.
#[derive(Parser, Debug)]
#[command(name = "doctect", version, about)]
struct Cli {
    /// Configuration file (JSON or YAML).
    #[arg(short, long, global = true, env = "DOC_DETECTIVE_CONFIG")]
    config: Option<PathBuf>,

    /// Log severity (silent, error, warning, info, debug); overrides the
    /// config's logLevel.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Scan documentation files for embedded tests.
    Detect(doctect_cli::detect::DetectArgs),
    /// Validate a document against a registered schema key.
    Validate(doctect_cli::validate::ValidateArgs),
    /// Migrate a document between schema generations.
    Transform(doctect_cli::transform::TransformArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LoadedConfig::default(),
    };
    if let Some(name) = &cli.log_level {
        config.parser.log_level = LogLevel::from_name(name)
            .ok_or_else(|| anyhow::anyhow!("unknown log level {name:?}"))?;
    }

    // Initialize tracing; RUST_LOG wins over the configured severity.
    let default_filter = match config.parser.log_level {
        LogLevel::Silent => "off",
        LogLevel::Error => "error",
        LogLevel::Warning => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Detect(args) => doctect_cli::detect::run(&args, &config),
        Commands::Validate(args) => doctect_cli::validate::run(&args),
        Commands::Transform(args) => doctect_cli::transform::run(&args),
    }
}
