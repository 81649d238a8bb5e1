//! Hive AST command implementation

use anyhow::{ensure, Context, Result};
use tl_sql::extract_hive_ast;

use crate::cli::{GlobalArgs, HiveAstArgs, OutputFormat};
use crate::commands::common::{extract_options, format_record, load_config, read_input, to_json};

/// Execute the hive-ast command
pub fn execute(args: &HiveAstArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let max_depth = args.max_depth.unwrap_or(config.max_ast_depth);
    ensure!(max_depth > 0, "--max-depth must be greater than zero");
    let options = extract_options(&config, &args.output);

    let text = read_input(&args.path)?;
    let record = extract_hive_ast(&text, max_depth, &options)
        .with_context(|| format!("Failed to read Hive AST from {}", args.path.display()))?;

    match args.output.output {
        OutputFormat::Json => println!("{}", to_json(&record, args.output.pretty)?),
        OutputFormat::Text => println!("{}", format_record(&record)),
    }
    Ok(())
}
