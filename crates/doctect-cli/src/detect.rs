//! # Detect Subcommand
//!
//! Scans documentation files for embedded tests and emits the detected
//! `test_v3` objects as a pretty-printed JSON array.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde_json::Value;

use doctect_parse::{parse_content, FileType};

use crate::config::LoadedConfig;
use crate::io::write_document;

/// Arguments for the detect subcommand.
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Files or directories to scan. Directories are walked recursively;
    /// only files matching a configured file type are parsed.
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Write the detected tests here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &DetectArgs, config: &LoadedConfig) -> anyhow::Result<()> {
    let mut files = Vec::new();
    for input in &args.input {
        collect_files(input, &config.file_types, true, &mut files)?;
    }
    files.sort();
    files.dedup();

    let mut tests: Vec<Value> = Vec::new();
    for path in &files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let file_type = config
            .file_types
            .iter()
            .find(|ft| ft.handles_path(&path.to_string_lossy()));
        let Some(file_type) = file_type else {
            continue;
        };
        let detected = parse_content(
            &config.parser,
            &content,
            &path.to_string_lossy(),
            file_type,
        );
        tracing::debug!(path = %path.display(), tests = detected.len(), "scanned file");
        tests.extend(detected);
    }

    tracing::info!(files = files.len(), tests = tests.len(), "detection complete");
    write_document(args.output.as_deref(), &Value::Array(tests))
}

fn collect_files(
    path: &Path,
    file_types: &[FileType],
    explicit: bool,
    out: &mut Vec<PathBuf>,
) -> anyhow::Result<()> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("no such input: {}", path.display()))?;
    if metadata.is_dir() {
        for entry in
            fs::read_dir(path).with_context(|| format!("could not list {}", path.display()))?
        {
            collect_files(&entry?.path(), file_types, false, out)?;
        }
        return Ok(());
    }
    let handled = file_types
        .iter()
        .any(|ft| ft.handles_path(&path.to_string_lossy()));
    // An explicitly-passed file is kept even when no file type claims
    // it; the scan loop decides whether it can be parsed.
    if handled || explicit {
        out.push(path.to_path_buf());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_detect_writes_tests_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("guide.md");
        fs::write(
            &doc,
            "<!-- test testId=\"t1\" -->\n<!-- step {\"wait\": 500} -->\n<!-- test end -->\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "no tests here").unwrap();

        let mut output = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        output.flush().unwrap();
        let args = DetectArgs {
            input: vec![dir.path().to_path_buf()],
            output: Some(output.path().to_path_buf()),
        };
        run(&args, &LoadedConfig::default()).unwrap();

        let written: Value =
            serde_json::from_str(&fs::read_to_string(output.path()).unwrap()).unwrap();
        let tests = written.as_array().unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0]["testId"], "t1");
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let args = DetectArgs {
            input: vec![PathBuf::from("/nonexistent/docs")],
            output: None,
        };
        assert!(run(&args, &LoadedConfig::default()).is_err());
    }
}
