//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tl_core::{Config, CoreError, LineageRecord};

use crate::cli::{GlobalArgs, OutputArgs};

/// Path argument meaning "read standard input"
pub(crate) const STDIN_PATH: &str = "-";

/// Load configuration: --config if given, else lineage.yml in the current
/// directory if present, else defaults.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    if let Some(path) = &global.config {
        return Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()));
    }
    match Config::load_from_dir(Path::new(".")) {
        Ok(config) => Ok(config),
        Err(CoreError::ConfigNotFound { .. }) => {
            log::debug!("no lineage.yml found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).context("Failed to load lineage.yml"),
    }
}

/// Read the whole input named by `path`, `-` being stdin
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new(STDIN_PATH) {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read standard input")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// `.sql` files directly inside `dir`, sorted by path
pub(crate) fn sql_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();
    Ok(files)
}

/// Serialize `value` as compact or pretty JSON
pub(crate) fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize to JSON")
}

/// Two-line text rendering of one record
pub(crate) fn format_record(record: &LineageRecord) -> String {
    format!(
        "targets: {}\nsources: {}",
        join_or_none(&record.target_names()),
        join_or_none(&record.source_names())
    )
}

fn join_or_none(names: &[&str]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

/// Engine options from config, with command-line overrides applied
pub(crate) fn extract_options(config: &Config, output: &OutputArgs) -> tl_core::ExtractOptions {
    let options = config.extract_options();
    if output.emit_cte_names {
        options.emit_cte_names(true)
    } else {
        options
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
