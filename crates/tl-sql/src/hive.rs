//! Reader for Hive parser output.
//!
//! Hive exposes its syntax tree as text in two shapes:
//!
//! ```text
//! (TOK_QUERY (TOK_FROM (TOK_TABREF (TOK_TABNAME db src))) ...)   toStringTree()
//!
//! nil                                                           dump()
//!    TOK_QUERY
//!       TOK_FROM
//!          TOK_TABREF
//!             TOK_TABNAME
//!                db
//!                src
//! ```
//!
//! Both are read into a `Node<HiveToken>` without recursion. Structural
//! tokens carry no text; every other atom (identifiers, literals, tokens
//! without lineage meaning) keeps its spelling as text.

use std::str::FromStr;

use strum_macros::EnumString;
use tl_core::{CanonicalKind, NativeKind, Node};

use crate::error::{SqlError, SqlResult};

/// Hive grammar token, as printed in an AST dump
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum HiveToken {
    #[strum(serialize = "nil")]
    Nil,
    #[strum(serialize = "TOK_QUERY")]
    Query,
    #[strum(serialize = "TOK_INSERT")]
    Insert,
    #[strum(serialize = "TOK_CREATETABLE")]
    CreateTable,
    #[strum(serialize = "TOK_CREATEVIEW")]
    CreateView,
    #[strum(serialize = "TOK_CREATE_MATERIALIZED_VIEW")]
    CreateMaterializedView,
    #[strum(serialize = "TOK_DESTINATION")]
    Destination,
    #[strum(serialize = "TOK_INSERT_INTO")]
    InsertInto,
    #[strum(serialize = "TOK_TAB")]
    Tab,
    #[strum(serialize = "TOK_TABNAME")]
    TabName,
    #[strum(serialize = "TOK_TABREF")]
    TabRef,
    #[strum(serialize = "TOK_SELECT")]
    Select,
    #[strum(serialize = "TOK_SELECTDI")]
    SelectDistinct,
    #[strum(
        serialize = "TOK_JOIN",
        serialize = "TOK_LEFTOUTERJOIN",
        serialize = "TOK_RIGHTOUTERJOIN",
        serialize = "TOK_FULLOUTERJOIN",
        serialize = "TOK_LEFTSEMIJOIN",
        serialize = "TOK_CROSSJOIN",
        serialize = "TOK_UNIQUEJOIN"
    )]
    Join,
    #[strum(
        serialize = "TOK_UNIONALL",
        serialize = "TOK_UNIONDISTINCT",
        serialize = "TOK_INTERSECTALL",
        serialize = "TOK_INTERSECTDISTINCT",
        serialize = "TOK_EXCEPTALL",
        serialize = "TOK_EXCEPTDISTINCT"
    )]
    SetOperation,
    #[strum(serialize = "TOK_SUBQUERY")]
    Subquery,
    #[strum(serialize = "TOK_CTE")]
    Cte,
    /// Identifiers, literals and every token without lineage meaning
    #[strum(default)]
    Atom(String),
}

impl HiveToken {
    /// Classify one atom of the dump
    pub fn from_atom(atom: &str) -> Self {
        HiveToken::from_str(atom).unwrap_or_else(|_| HiveToken::Atom(atom.to_string()))
    }

    /// True for tokens the lineage walk dispatches on
    pub fn is_structural(&self) -> bool {
        !matches!(self, HiveToken::Atom(_))
    }
}

impl NativeKind for HiveToken {
    fn canonical(&self) -> CanonicalKind {
        match self {
            HiveToken::Nil => CanonicalKind::Root,
            HiveToken::Query => CanonicalKind::Query,
            HiveToken::Insert
            | HiveToken::CreateTable
            | HiveToken::CreateView
            | HiveToken::CreateMaterializedView => CanonicalKind::Insert,
            HiveToken::Destination | HiveToken::InsertInto => CanonicalKind::Destination,
            HiveToken::Tab => CanonicalKind::Table,
            HiveToken::TabName => CanonicalKind::TableName,
            HiveToken::TabRef => CanonicalKind::TableRef,
            HiveToken::Select | HiveToken::SelectDistinct => CanonicalKind::Select,
            HiveToken::Join => CanonicalKind::Join,
            HiveToken::SetOperation => CanonicalKind::Union,
            HiveToken::Subquery => CanonicalKind::SubqueryAlias,
            HiveToken::Cte => CanonicalKind::CteDef,
            HiveToken::Atom(_) => CanonicalKind::Other,
        }
    }
}

/// Hive syntax tree node
pub type HiveNode = Node<HiveToken>;

/// Read a Hive AST from its `toStringTree()` or `dump()` text.
///
/// Nesting deeper than `max_depth` fails with [`SqlError::AstTooDeep`].
pub fn parse_ast(text: &str, max_depth: usize) -> SqlResult<HiveNode> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Err(SqlError::EmptySql);
    }
    if trimmed.starts_with('(') {
        read_tree_string(text, max_depth)
    } else {
        read_dump(text, max_depth)
    }
}

fn node_for(atom: &str) -> HiveNode {
    let token = HiveToken::from_atom(atom);
    if token.is_structural() {
        Node::new(token)
    } else {
        Node::leaf(HiveToken::Atom(atom.to_string()), unquote(atom))
    }
}

/// Backticks quote identifiers and are dropped; string literals keep
/// their quotes.
fn unquote(atom: &str) -> String {
    match atom.strip_prefix('`').and_then(|rest| rest.strip_suffix('`')) {
        Some(inner) => inner.to_string(),
        None => atom.to_string(),
    }
}

/// Single root of a sequence of top-level nodes
fn into_root(mut top: Vec<HiveNode>) -> HiveNode {
    if top.len() == 1 {
        if let Some(root) = top.pop() {
            return root;
        }
    }
    Node::new(HiveToken::Nil).with_children(top)
}

fn malformed(message: impl Into<String>, line: usize) -> SqlError {
    SqlError::MalformedAst {
        message: message.into(),
        line,
    }
}

enum Lexeme<'t> {
    Open,
    Close,
    Atom(&'t str),
}

/// Splits parenthesised tree text into lexemes, tracking line numbers
struct Lexer<'t> {
    text: &'t str,
    pos: usize,
    line: usize,
}

impl<'t> Lexer<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
        }
    }

    fn next_lexeme(&mut self) -> SqlResult<Option<Lexeme<'t>>> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            if bytes[self.pos] == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return Ok(None);
        }

        let start = self.pos;
        match bytes[start] {
            b'(' => {
                self.pos += 1;
                Ok(Some(Lexeme::Open))
            }
            b')' => {
                self.pos += 1;
                Ok(Some(Lexeme::Close))
            }
            quote @ (b'\'' | b'"' | b'`') => {
                self.pos += 1;
                self.skip_quoted(quote, start)?;
                Ok(Some(Lexeme::Atom(&self.text[start..self.pos])))
            }
            _ => {
                while self.pos < bytes.len()
                    && !bytes[self.pos].is_ascii_whitespace()
                    && bytes[self.pos] != b'('
                    && bytes[self.pos] != b')'
                {
                    self.pos += 1;
                }
                Ok(Some(Lexeme::Atom(&self.text[start..self.pos])))
            }
        }
    }

    /// Advance past the closing `quote`; backslash escapes one byte
    fn skip_quoted(&mut self, quote: u8, start: usize) -> SqlResult<()> {
        let bytes = self.text.as_bytes();
        let opened_on = self.line;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' if quote != b'`' => self.pos += 2,
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
        Err(malformed(
            format!(
                "unterminated quoted atom starting with {}",
                &self.text[start..(start + 1).min(self.text.len())]
            ),
            opened_on,
        ))
    }
}

fn read_tree_string(text: &str, max_depth: usize) -> SqlResult<HiveNode> {
    let mut lexer = Lexer::new(text);
    let mut open: Vec<HiveNode> = Vec::new();
    let mut top: Vec<HiveNode> = Vec::new();

    while let Some(lexeme) = lexer.next_lexeme()? {
        let node = match lexeme {
            Lexeme::Open => {
                let head = match lexer.next_lexeme()? {
                    Some(Lexeme::Atom(atom)) => atom,
                    _ => return Err(malformed("'(' must be followed by a token", lexer.line)),
                };
                if open.len() >= max_depth {
                    return Err(SqlError::AstTooDeep {
                        limit: max_depth,
                        line: lexer.line,
                    });
                }
                open.push(node_for(head));
                continue;
            }
            Lexeme::Close => match open.pop() {
                Some(node) => node,
                None => return Err(malformed("unbalanced ')'", lexer.line)),
            },
            Lexeme::Atom(atom) => node_for(atom),
        };
        match open.last_mut() {
            Some(parent) => parent.push(node),
            None => top.push(node),
        }
    }

    if !open.is_empty() {
        return Err(malformed(
            format!("{} unclosed '('", open.len()),
            lexer.line,
        ));
    }
    Ok(into_root(top))
}

/// Read the indented `dump()` form: one atom per line, children indented
/// deeper than their parent.
fn read_dump(text: &str, max_depth: usize) -> SqlResult<HiveNode> {
    let mut open: Vec<(usize, HiveNode)> = Vec::new();
    let mut top: Vec<HiveNode> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let atom = line.trim();
        if atom.is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();

        while open.last().is_some_and(|(depth, _)| *depth >= indent) {
            close_last(&mut open, &mut top);
        }
        if open.len() >= max_depth {
            return Err(SqlError::AstTooDeep {
                limit: max_depth,
                line: index + 1,
            });
        }
        open.push((indent, node_for(atom)));
    }
    while !open.is_empty() {
        close_last(&mut open, &mut top);
    }

    if top.is_empty() {
        return Err(SqlError::EmptySql);
    }
    Ok(into_root(top))
}

fn close_last(open: &mut Vec<(usize, HiveNode)>, top: &mut Vec<HiveNode>) {
    if let Some((_, node)) = open.pop() {
        match open.last_mut() {
            Some((_, parent)) => parent.push(node),
            None => top.push(node),
        }
    }
}

#[cfg(test)]
#[path = "hive_test.rs"]
mod tests;
