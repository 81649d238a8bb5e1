//! Table lineage from SQL text or a Hive AST dump

use serde::Serialize;
use tl_core::{ExtractOptions, LineageExtractor, LineageRecord};

use crate::error::SqlResult;
use crate::hive;
use crate::parser::SqlParser;
use crate::plan;

/// Lineage of one statement of a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementLineage {
    /// Zero-based position of the statement in the script
    pub index: usize,
    #[serde(flatten)]
    pub lineage: LineageRecord,
}

/// Parse `sql` and extract one lineage record per statement
pub fn extract_sql(
    parser: &SqlParser,
    sql: &str,
    options: &ExtractOptions,
) -> SqlResult<Vec<StatementLineage>> {
    let statements = parser.parse(sql)?;
    let extractor = LineageExtractor::new(*options);
    Ok(statements
        .iter()
        .enumerate()
        .map(|(index, statement)| {
            let tree = plan::lower_statement(statement);
            StatementLineage {
                index,
                lineage: extractor.extract(&tree),
            }
        })
        .collect())
}

/// Ordered union of the records of a whole script
pub fn summarize(statements: &[StatementLineage]) -> LineageRecord {
    statements
        .iter()
        .fold(LineageRecord::default(), |acc, stmt| acc.merge(&stmt.lineage))
}

/// Read a Hive AST dump and extract its lineage
pub fn extract_hive_ast(
    text: &str,
    max_depth: usize,
    options: &ExtractOptions,
) -> SqlResult<LineageRecord> {
    let tree = hive::parse_ast(text, max_depth)?;
    Ok(LineageExtractor::new(*options).extract(&tree))
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
