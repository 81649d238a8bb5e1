//! tl - table-level lineage for SQL scripts and Hive syntax trees

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{extract, hive_ast};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Extract(args) => extract::execute(args, &cli.global),
        cli::Commands::HiveAst(args) => hive_ast::execute(args, &cli.global),
    }
}

/// `warn` by default, `debug` with --verbose; RUST_LOG overrides both
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
