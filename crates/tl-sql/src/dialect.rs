//! Dialects accepted by the SQL text front end

use sqlparser::ast::Statement;
use sqlparser::dialect::{
    DatabricksDialect as SqlParserDatabricks, Dialect, GenericDialect as SqlParserGeneric,
    HiveDialect as SqlParserHive,
};
use sqlparser::parser::Parser;

use crate::error::{SqlError, SqlResult};

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Parse SQL into AST statements
    fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        Parser::parse_sql(self.parser_dialect(), sql).map_err(|e| {
            let message = e.to_string();
            let (line, column) = parse_location_from_error(&message);
            SqlError::ParseError {
                message,
                line,
                column,
            }
        })
    }

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// Pull `Line: N, Column: M` out of a sqlparser error message.
///
/// `ParserError` carries no structured location, only text. Returns
/// `(0, 0)` when the message has no location.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let number_after = |label: &str| -> Option<usize> {
        let start = msg.find(label)? + label.len();
        let rest = &msg[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    };
    match (number_after("Line: "), number_after("Column: ")) {
        (Some(line), Some(column)) => (line, column),
        _ => (0, 0),
    }
}

/// HiveQL
pub struct HiveDialect {
    dialect: SqlParserHive,
}

impl HiveDialect {
    pub fn new() -> Self {
        Self {
            dialect: SqlParserHive {},
        }
    }
}

impl Default for HiveDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for HiveDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "hive"
    }
}

/// Spark SQL, parsed with sqlparser's Databricks grammar
pub struct SparkDialect {
    dialect: SqlParserDatabricks,
}

impl SparkDialect {
    pub fn new() -> Self {
        Self {
            dialect: SqlParserDatabricks {},
        }
    }
}

impl Default for SparkDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for SparkDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "spark"
    }
}

/// Permissive ANSI-style SQL
pub struct GenericDialect {
    dialect: SqlParserGeneric,
}

impl GenericDialect {
    pub fn new() -> Self {
        Self {
            dialect: SqlParserGeneric {},
        }
    }
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for GenericDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn name(&self) -> &'static str {
        "generic"
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
