//! Error types for tl-sql

use thiserror::Error;

/// SQL parsing and AST reading errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL parse error (S001)
    #[error("[S001] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty SQL (S002)
    #[error("[S002] SQL is empty")]
    EmptySql,

    /// Unknown dialect name (S003)
    #[error("[S003] Unknown SQL dialect: {0} (expected hive, spark or generic)")]
    UnknownDialect(String),

    /// Malformed Hive AST text (S004)
    #[error("[S004] Malformed Hive AST at line {line}: {message}")]
    MalformedAst { message: String, line: usize },

    /// Hive AST nesting exceeds the configured limit (S005)
    #[error("[S005] Hive AST nesting exceeds {limit} levels at line {line}")]
    AstTooDeep { limit: usize, line: usize },
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
