//! Qualified table names and the builder that assembles them from a
//! `TABLE_NAME` node.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use crate::node::SyntaxNode;

/// Separator between the parts of a qualified name
pub const PART_SEPARATOR: &str = ".";

/// A dotted table identifier such as `db.table`.
///
/// Case and characters are kept exactly as the upstream parser supplied them.
/// A `QualifiedName` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Create a `QualifiedName`, returning `None` if the name is empty.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Build the dotted name of a `TABLE_NAME` node.
///
/// Concatenates the text of every child, in order, separated by `.`.
/// Children without text contribute nothing. A node without usable children
/// yields an empty string, which callers must treat as "no name".
pub fn build<N: SyntaxNode>(table_name: &N) -> String {
    table_name
        .children()
        .iter()
        .filter_map(|part| part.text())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(PART_SEPARATOR)
}

/// [`build`] followed by the non-empty check.
pub fn build_qualified<N: SyntaxNode>(table_name: &N) -> Option<QualifiedName> {
    QualifiedName::try_new(build(table_name))
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QualifiedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for QualifiedName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for QualifiedName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or_else(|| "qualified name must not be empty".to_string())
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.0
    }
}

impl PartialEq<str> for QualifiedName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for QualifiedName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for QualifiedName {
    fn eq(&self, other: &String) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "qualified_name_test.rs"]
mod tests;
