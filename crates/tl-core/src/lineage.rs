//! Lineage accumulator and the immutable record it produces.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::qualified_name::QualifiedName;

/// Targets and sources collected while walking one tree.
///
/// Both collections keep discovery order and ignore repeated names.
#[derive(Debug, Default)]
pub struct LineageAccumulator {
    targets: IndexSet<QualifiedName>,
    sources: IndexSet<QualifiedName>,
}

impl LineageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a written table. Returns `false` if it was already recorded.
    pub fn add_target(&mut self, name: QualifiedName) -> bool {
        self.targets.insert(name)
    }

    /// Record a read table. Returns `false` if it was already recorded.
    pub fn add_source(&mut self, name: QualifiedName) -> bool {
        self.sources.insert(name)
    }

    /// Freeze the collected names into a [`LineageRecord`]
    pub fn finalize(self) -> LineageRecord {
        LineageRecord {
            targets: self.targets.into_iter().collect(),
            sources: self.sources.into_iter().collect(),
        }
    }
}

/// Tables written (`targets`) and read (`sources`) by one statement.
///
/// The same name may appear in both lists, e.g. a table that is read and
/// overwritten by the same statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageRecord {
    targets: Vec<QualifiedName>,
    sources: Vec<QualifiedName>,
}

impl LineageRecord {
    pub fn targets(&self) -> &[QualifiedName] {
        &self.targets
    }

    pub fn sources(&self) -> &[QualifiedName] {
        &self.sources
    }

    /// Target names as plain strings
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|n| n.as_str()).collect()
    }

    /// Source names as plain strings
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|n| n.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.sources.is_empty()
    }

    /// Ordered union of two records: names of `self` first, then names of
    /// `other` not already present.
    pub fn merge(&self, other: &LineageRecord) -> LineageRecord {
        let mut acc = LineageAccumulator::new();
        for name in self.targets.iter().chain(other.targets.iter()) {
            acc.add_target(name.clone());
        }
        for name in self.sources.iter().chain(other.sources.iter()) {
            acc.add_source(name.clone());
        }
        acc.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qn(s: &str) -> QualifiedName {
        QualifiedName::try_new(s).unwrap()
    }

    #[test]
    fn test_add_keeps_discovery_order() {
        let mut acc = LineageAccumulator::new();
        acc.add_source(qn("db1.source1"));
        acc.add_source(qn("source2"));
        acc.add_source(qn("db2.source3"));
        let record = acc.finalize();
        assert_eq!(
            record.source_names(),
            vec!["db1.source1", "source2", "db2.source3"]
        );
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mut acc = LineageAccumulator::new();
        assert!(acc.add_source(qn("t")));
        assert!(!acc.add_source(qn("t")));
        assert!(acc.add_target(qn("t")));
        assert!(!acc.add_target(qn("t")));
        let record = acc.finalize();
        assert_eq!(record.source_names(), vec!["t"]);
        assert_eq!(record.target_names(), vec!["t"]);
    }

    #[test]
    fn test_empty_record() {
        let record = LineageAccumulator::new().finalize();
        assert!(record.is_empty());
        assert!(record.targets().is_empty());
    }

    #[test]
    fn test_merge_is_ordered_union() {
        let mut a = LineageAccumulator::new();
        a.add_target(qn("out1"));
        a.add_source(qn("s1"));
        a.add_source(qn("s2"));
        let mut b = LineageAccumulator::new();
        b.add_target(qn("out2"));
        b.add_source(qn("s2"));
        b.add_source(qn("s3"));

        let merged = a.finalize().merge(&b.finalize());
        assert_eq!(merged.target_names(), vec!["out1", "out2"]);
        assert_eq!(merged.source_names(), vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_record_json_shape() {
        let mut acc = LineageAccumulator::new();
        acc.add_target(qn("db.target_table"));
        acc.add_source(qn("src"));
        let json = serde_json::to_string(&acc.finalize()).unwrap();
        assert_eq!(json, r#"{"targets":["db.target_table"],"sources":["src"]}"#);
    }
}
