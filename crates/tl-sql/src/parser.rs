//! SQL parser wrapper

use crate::dialect::{GenericDialect, HiveDialect, SparkDialect, SqlDialect};
use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Statement;
use tl_core::Dialect;

/// SQL parser that wraps sqlparser-rs with dialect support
pub struct SqlParser {
    dialect: Box<dyn SqlDialect>,
}

impl SqlParser {
    /// Create a new parser with the Hive dialect
    pub fn hive() -> Self {
        Self {
            dialect: Box::new(HiveDialect::new()),
        }
    }

    /// Create a new parser with the Spark dialect
    pub fn spark() -> Self {
        Self {
            dialect: Box::new(SparkDialect::new()),
        }
    }

    /// Create a new parser with the generic dialect
    pub fn generic() -> Self {
        Self {
            dialect: Box::new(GenericDialect::new()),
        }
    }

    /// Create a parser for a configured dialect
    pub fn from_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Hive => Self::hive(),
            Dialect::Spark => Self::spark(),
            Dialect::Generic => Self::generic(),
        }
    }

    /// Create a parser from dialect name
    pub fn from_dialect_name(name: &str) -> SqlResult<Self> {
        match name.to_lowercase().as_str() {
            "hive" => Ok(Self::hive()),
            "spark" => Ok(Self::spark()),
            "generic" => Ok(Self::generic()),
            _ => Err(SqlError::UnknownDialect(name.to_string())),
        }
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        self.dialect.parse(sql)
    }

    /// Parse SQL and return the first statement
    pub fn parse_single(&self, sql: &str) -> SqlResult<Statement> {
        let stmts = self.parse(sql)?;
        stmts.into_iter().next().ok_or(SqlError::EmptySql)
    }

    /// Get the dialect name
    pub fn dialect_name(&self) -> &'static str {
        self.dialect.name()
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::hive()
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
