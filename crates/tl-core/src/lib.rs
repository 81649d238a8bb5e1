//! tl-core - Core library for table lineage
//!
//! This crate provides the parser-independent syntax tree contract, the
//! canonical node kinds, the CTE registry, and the traversal engine that
//! classifies table names into targets and sources.

pub mod config;
pub mod cte;
pub mod engine;
pub mod error;
pub mod kind;
pub mod lineage;
pub mod node;
pub mod qualified_name;

pub use config::{Config, Dialect, ExtractOptions};
pub use cte::{CteRegistry, ScopeId, RECURSIVE_MARKER};
pub use engine::{extract, Context, LineageExtractor};
pub use error::{CoreError, CoreResult, MalformedTree};
pub use kind::{CanonicalKind, NativeKind};
pub use lineage::{LineageAccumulator, LineageRecord};
pub use node::{Node, SyntaxNode};
pub use qualified_name::QualifiedName;
