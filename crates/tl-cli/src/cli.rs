//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tl_core::Dialect;

/// tl - which tables a SQL statement reads and writes
#[derive(Parser, Debug)]
#[command(name = "tl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: lineage.yml in the current directory, if any)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract target and source tables from SQL text
    Extract(ExtractArgs),

    /// Extract target and source tables from a Hive AST dump
    HiveAst(HiveAstArgs),
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// A .sql file, a directory of .sql files, or `-` for stdin
    pub path: PathBuf,

    /// SQL dialect (overrides the config file)
    #[arg(short, long, value_enum)]
    pub dialect: Option<DialectArg>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the hive-ast command
#[derive(Args, Debug)]
pub struct HiveAstArgs {
    /// File holding `ASTNode.dump()` or `toStringTree()` output, or `-`
    pub path: PathBuf,

    /// Maximum nesting depth accepted (overrides the config file)
    #[arg(long)]
    pub max_depth: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output options shared by both commands
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Also report references to CTEs under the CTE name
    #[arg(long)]
    pub emit_cte_names: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON document
    Json,
    /// One line per target / source list
    Text,
}

/// Dialects selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectArg {
    Hive,
    Spark,
    Generic,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Hive => Dialect::Hive,
            DialectArg::Spark => Dialect::Spark,
            DialectArg::Generic => Dialect::Generic,
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
