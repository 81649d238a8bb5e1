//! Canonical node kinds shared by every parser integration.
//!
//! Each upstream grammar has its own node types. The traversal engine never
//! looks at those directly: an integration implements [`NativeKind`] for its
//! node-type value, folding it into one [`CanonicalKind`]. Anything the
//! integration does not recognise becomes [`CanonicalKind::Other`], which the
//! engine walks through without extracting a name.
//!
//! | kind             | meaning                                              |
//! |------------------|------------------------------------------------------|
//! | `ROOT`           | top of the tree (script, `nil` token)                |
//! | `INSERT`         | a statement that writes a table                      |
//! | `DESTINATION`    | the write target clause of an `INSERT`               |
//! | `TABLE`          | a table inside a destination                         |
//! | `TABLE_NAME`     | ordered identifier parts of a table name             |
//! | `TABLE_REF`      | a table read in a `FROM`/`JOIN`                      |
//! | `SELECT`         | a select block                                       |
//! | `QUERY`          | a query block (may carry CTE definitions)            |
//! | `JOIN`           | a join of two or more relations                      |
//! | `UNION`          | a set operation over query branches                  |
//! | `SUBQUERY_ALIAS` | a named subquery / derived table                     |
//! | `CTE_DEF`        | one or more `WITH` definitions                       |
//! | `CTE_REF`        | an already-resolved reference to a CTE               |
//! | `OTHER`          | everything else                                      |

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Closed set of node categories the traversal engine dispatches on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalKind {
    Root,
    Insert,
    Destination,
    Table,
    TableName,
    TableRef,
    Select,
    Query,
    Join,
    Union,
    SubqueryAlias,
    CteDef,
    CteRef,
    Other,
}

impl CanonicalKind {
    /// Query blocks open a new CTE scope.
    pub fn opens_scope(self) -> bool {
        matches!(self, CanonicalKind::Select | CanonicalKind::Query)
    }
}

/// Mapping from a parser-native node type to a [`CanonicalKind`].
///
/// The mapping must be total: unknown native types return
/// [`CanonicalKind::Other`] rather than failing.
pub trait NativeKind {
    fn canonical(&self) -> CanonicalKind;
}

impl NativeKind for CanonicalKind {
    fn canonical(&self) -> CanonicalKind {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display_uses_screaming_snake_case() {
        assert_eq!(CanonicalKind::TableName.to_string(), "TABLE_NAME");
        assert_eq!(CanonicalKind::SubqueryAlias.to_string(), "SUBQUERY_ALIAS");
        assert_eq!(CanonicalKind::Root.to_string(), "ROOT");
    }

    #[test]
    fn test_from_str_round_trips_every_kind() {
        for kind in CanonicalKind::iter() {
            let parsed = CanonicalKind::from_str(&kind.to_string()).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!(CanonicalKind::from_str("TOK_QUERY").is_err());
    }

    #[test]
    fn test_identity_mapping() {
        assert_eq!(CanonicalKind::CteDef.canonical(), CanonicalKind::CteDef);
    }

    #[test]
    fn test_only_query_blocks_open_scope() {
        let scoped: Vec<_> = CanonicalKind::iter().filter(|k| k.opens_scope()).collect();
        assert_eq!(scoped, vec![CanonicalKind::Select, CanonicalKind::Query]);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&CanonicalKind::CteRef).unwrap();
        assert_eq!(json, "\"CTE_REF\"");
    }
}
