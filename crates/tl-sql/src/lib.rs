//! tl-sql - Parser integrations for table lineage
//!
//! This crate feeds the traversal engine of `tl-core` from two upstream
//! parsers: sqlparser-rs statements (Hive, Spark and generic dialects),
//! lowered into a small plan tree, and the textual syntax tree printed by
//! the Hive parser.

pub mod dialect;
pub mod error;
pub mod extractor;
pub mod hive;
pub mod parser;
pub mod plan;

pub use dialect::{GenericDialect, HiveDialect, SparkDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use extractor::{extract_hive_ast, extract_sql, summarize, StatementLineage};
pub use hive::{parse_ast, HiveNode, HiveToken};
pub use parser::SqlParser;
pub use plan::{lower_statement, lower_statements, PlanKind, PlanNode};
