//! Extract command implementation

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use tl_core::{Dialect, ExtractOptions, LineageRecord};
use tl_sql::{extract_sql, summarize, SqlParser, StatementLineage};

use crate::cli::{ExtractArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{
    extract_options, format_record, load_config, read_input, sql_files, to_json,
};

/// Lineage of one SQL script
#[derive(Debug, Serialize)]
struct ScriptLineage {
    statements: Vec<StatementLineage>,
    /// Union over all statements
    summary: LineageRecord,
}

/// Execute the extract command
pub fn execute(args: &ExtractArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let dialect = args.dialect.map(Dialect::from).unwrap_or(config.dialect);
    let parser = SqlParser::from_dialect(dialect);
    let options = extract_options(&config, &args.output);
    log::debug!("extracting with dialect {}", parser.dialect_name());

    let rendered = if args.path.is_dir() {
        let mut scripts: IndexMap<String, ScriptLineage> = IndexMap::new();
        for file in sql_files(&args.path)? {
            let lineage = script_lineage(&parser, &file, &options)?;
            scripts.insert(file.display().to_string(), lineage);
        }
        match args.output.output {
            OutputFormat::Json => to_json(&scripts, args.output.pretty)?,
            OutputFormat::Text => scripts
                .iter()
                .map(|(path, script)| format!("== {} ==\n{}", path, format_script(script)))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    } else {
        let script = script_lineage(&parser, &args.path, &options)?;
        match args.output.output {
            OutputFormat::Json => to_json(&script, args.output.pretty)?,
            OutputFormat::Text => format_script(&script),
        }
    };

    println!("{}", rendered);
    Ok(())
}

fn script_lineage(
    parser: &SqlParser,
    path: &Path,
    options: &ExtractOptions,
) -> Result<ScriptLineage> {
    let sql = read_input(path)?;
    let statements = extract_sql(parser, &sql, options)
        .with_context(|| format!("Failed to extract lineage from {}", path.display()))?;
    let summary = summarize(&statements);
    Ok(ScriptLineage {
        statements,
        summary,
    })
}

fn format_script(script: &ScriptLineage) -> String {
    script
        .statements
        .iter()
        .map(|stmt| format!("-- statement {}\n{}", stmt.index, format_record(&stmt.lineage)))
        .collect::<Vec<_>>()
        .join("\n")
}
