//! Traversal engine: walks a syntax tree and classifies table names into
//! targets and sources.
//!
//! The walk is depth-first and left-to-right, driven by an explicit work
//! stack so that tree depth never translates into native stack depth. Every
//! pending step carries the context it was reached in (reading or writing)
//! and the CTE scope of its enclosing query block.
//!
//! CTE policy: the tables read by a CTE body are recorded when the
//! definition is walked; later references to the CTE by name are
//! suppressed, unless [`ExtractOptions::emit_cte_as_synthetic_name`] asks
//! for them to be recorded under the CTE's own name as well.
//!
//! The main body of a query block sees every definition of the block. A
//! definition body sees only the definitions before it, and itself only
//! under `WITH RECURSIVE`; any other use of those names reads a real table.

use crate::config::ExtractOptions;
use crate::cte::{CteRegistry, ScopeId, RECURSIVE_MARKER};
use crate::error::MalformedTree;
use crate::kind::CanonicalKind;
use crate::lineage::{LineageAccumulator, LineageRecord};
use crate::node::SyntaxNode;
use crate::qualified_name::{build_qualified, QualifiedName};

/// Whether a table reached in this position is read or written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Source,
    Target,
}

/// Stateless lineage extractor.
///
/// Holds only its options; every call to [`extract`](Self::extract) builds
/// its own registry and accumulator, so one extractor can be shared freely
/// between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineageExtractor {
    options: ExtractOptions,
}

impl LineageExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Classify every table name under `root`
    pub fn extract<N: SyntaxNode>(&self, root: &N) -> LineageRecord {
        let mut walk = Walk::new(self.options);
        walk.run(root);
        walk.lineage.finalize()
    }
}

/// Extract with default options
pub fn extract<N: SyntaxNode>(root: &N) -> LineageRecord {
    LineageExtractor::default().extract(root)
}

struct Step<'a, N> {
    node: &'a N,
    context: Context,
    scope: ScopeId,
}

/// State of a single extraction
struct Walk<'a, N> {
    options: ExtractOptions,
    registry: CteRegistry<'a, N>,
    lineage: LineageAccumulator,
    pending: Vec<Step<'a, N>>,
}

impl<'a, N: SyntaxNode> Walk<'a, N> {
    fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            registry: CteRegistry::new(),
            lineage: LineageAccumulator::new(),
            pending: Vec::new(),
        }
    }

    fn run(&mut self, root: &'a N) {
        let root_scope = self.registry.root();
        let scope = self.registry.open_scope(root_scope);
        self.pending.push(Step {
            node: root,
            context: Context::Source,
            scope,
        });
        while let Some(step) = self.pending.pop() {
            self.visit(step);
        }
    }

    fn visit(&mut self, step: Step<'a, N>) {
        let Step {
            node,
            context,
            scope,
        } = step;

        let kind = node.canonical_kind();
        if kind.opens_scope() {
            self.visit_block(node, scope);
            return;
        }

        match kind {
            CanonicalKind::Root | CanonicalKind::Other => {
                self.push_children(node, context, scope);
            }
            CanonicalKind::Insert => self.visit_insert(node, scope),
            CanonicalKind::Destination => self.record_destination(node),
            CanonicalKind::Table => {
                if let Some(name) = self.name_under(node, CanonicalKind::Table) {
                    self.record(name, context, scope);
                }
            }
            CanonicalKind::TableName => {
                if context == Context::Target {
                    match build_qualified(node) {
                        Some(name) => self.record(name, context, scope),
                        None => skip(MalformedTree::EmptyName {
                            kind: CanonicalKind::TableName,
                        }),
                    }
                }
            }
            CanonicalKind::TableRef => self.visit_table_ref(node, context, scope),
            CanonicalKind::Select | CanonicalKind::Query => self.visit_block(node, scope),
            CanonicalKind::Join | CanonicalKind::Union => {
                self.push_children(node, Context::Source, scope);
            }
            CanonicalKind::SubqueryAlias => self.push_children(node, context, scope),
            CanonicalKind::CteDef => {
                // Outside a query block: the definitions stay visible to the
                // following siblings, their bodies start from the enclosing scope
                let outer = self.registry.parent(scope).unwrap_or(scope);
                let mut steps = Vec::new();
                self.define_ctes(node, scope, outer, &mut steps);
                self.schedule(steps);
            }
            CanonicalKind::CteRef => {
                if self.options.emit_cte_as_synthetic_name {
                    if let Some(name) = node.text().and_then(|t| QualifiedName::try_new(t)) {
                        self.lineage.add_source(name);
                    }
                }
                self.push_children(node, context, scope);
            }
        }
    }

    /// Schedule all children of `node`, preserving left-to-right order
    fn push_children(&mut self, node: &'a N, context: Context, scope: ScopeId) {
        for child in node.children().iter().rev() {
            self.pending.push(Step {
                node: child,
                context,
                scope,
            });
        }
    }

    /// Schedule `steps` so that they run in the order given
    fn schedule(&mut self, steps: Vec<Step<'a, N>>) {
        self.pending.extend(steps.into_iter().rev());
    }

    /// `QUERY` / `SELECT`: a new scope holding every `CTE_DEF` of the block,
    /// registered up front since Hive prints `TOK_CTE` after the body.
    fn visit_block(&mut self, node: &'a N, scope: ScopeId) {
        let block = self.registry.open_scope(scope);
        let mut visible = scope;
        let mut steps = Vec::with_capacity(node.children().len());
        for child in node.children() {
            if child.canonical_kind() == CanonicalKind::CteDef {
                visible = self.define_ctes(child, block, visible, &mut steps);
            } else {
                steps.push(Step {
                    node: child,
                    context: Context::Source,
                    scope: block,
                });
            }
        }
        self.schedule(steps);
    }

    fn visit_insert(&mut self, node: &'a N, scope: ScopeId) {
        let mut has_target = false;
        for child in node.children().iter().rev() {
            let context = match child.canonical_kind() {
                CanonicalKind::Destination
                | CanonicalKind::Table
                | CanonicalKind::TableRef
                | CanonicalKind::TableName => {
                    has_target = true;
                    Context::Target
                }
                CanonicalKind::SubqueryAlias if aliases_relation(child) => {
                    has_target = true;
                    Context::Target
                }
                _ => Context::Source,
            };
            self.pending.push(Step {
                node: child,
                context,
                scope,
            });
        }
        if !has_target {
            skip(MalformedTree::MissingChild {
                parent: CanonicalKind::Insert,
                expected: CanonicalKind::Destination,
            });
        }
    }

    /// `DESTINATION` → `TABLE` → `TABLE_NAME`
    fn record_destination(&mut self, node: &'a N) {
        let Some(table) = node.child_of_kind(CanonicalKind::Table) else {
            // Directory and temporary-file destinations carry no table
            log::trace!("destination without a table, nothing to record");
            return;
        };
        if let Some(name) = self.name_under(table, CanonicalKind::Table) {
            log::trace!("target {}", name);
            self.lineage.add_target(name);
        }
    }

    fn visit_table_ref(&mut self, node: &'a N, context: Context, scope: ScopeId) {
        if let Some(name) = self.name_under(node, CanonicalKind::TableRef) {
            self.record(name, context, scope);
        }
        for child in node.children().iter().rev() {
            if child.canonical_kind() != CanonicalKind::TableName {
                self.pending.push(Step {
                    node: child,
                    context: Context::Source,
                    scope,
                });
            }
        }
    }

    /// Qualified name held by the `TABLE_NAME` child of `node`
    fn name_under(&self, node: &'a N, parent: CanonicalKind) -> Option<QualifiedName> {
        let Some(table_name) = node.child_of_kind(CanonicalKind::TableName) else {
            skip(MalformedTree::MissingChild {
                parent,
                expected: CanonicalKind::TableName,
            });
            return None;
        };
        let name = build_qualified(table_name);
        if name.is_none() {
            skip(MalformedTree::EmptyName { kind: parent });
        }
        name
    }

    fn record(&mut self, name: QualifiedName, context: Context, scope: ScopeId) {
        match context {
            Context::Target => {
                log::trace!("target {}", name);
                self.lineage.add_target(name);
            }
            Context::Source if self.registry.is_defined(&name, scope) => {
                if self.options.emit_cte_as_synthetic_name {
                    log::trace!("source {} (cte)", name);
                    self.lineage.add_source(name);
                } else {
                    log::trace!("reference to cte {} suppressed", name);
                }
            }
            Context::Source => {
                log::trace!("source {}", name);
                self.lineage.add_source(name);
            }
        }
    }

    /// Register the definitions carried by a `CTE_DEF` node in `scope` and
    /// queue their bodies onto `steps`.
    ///
    /// A `CTE_DEF` either lists definitions as `SUBQUERY_ALIAS` / `CTE_DEF`
    /// children, or is one definition named by its own text or by its
    /// trailing name leaf. Each body is walked in a scope chained onto
    /// `visible` that holds the definitions before it. Returns the end of
    /// that chain.
    fn define_ctes(
        &mut self,
        node: &'a N,
        scope: ScopeId,
        mut visible: ScopeId,
        steps: &mut Vec<Step<'a, N>>,
    ) -> ScopeId {
        let listed = node.children().iter().any(is_definition);
        if !listed {
            return self.define_one(node, false, scope, visible, steps);
        }

        let recursive = node
            .text()
            .is_some_and(|text| text.eq_ignore_ascii_case(RECURSIVE_MARKER));
        for child in node.children() {
            if is_definition(child) {
                visible = self.define_one(child, recursive, scope, visible, steps);
            } else {
                steps.push(Step {
                    node: child,
                    context: Context::Source,
                    scope: visible,
                });
            }
        }
        visible
    }

    fn define_one(
        &mut self,
        definition: &'a N,
        recursive: bool,
        scope: ScopeId,
        visible: ScopeId,
        steps: &mut Vec<Step<'a, N>>,
    ) -> ScopeId {
        let (body_scope, after) = match alias_of(definition) {
            Some(name) => {
                self.registry.define(name, definition, scope);
                let after = self.registry.open_scope(visible);
                self.registry.define(name, definition, after);
                (if recursive { after } else { visible }, after)
            }
            None => {
                skip(MalformedTree::EmptyName {
                    kind: definition.canonical_kind(),
                });
                (visible, visible)
            }
        };
        for child in definition.children() {
            steps.push(Step {
                node: child,
                context: Context::Source,
                scope: body_scope,
            });
        }
        after
    }
}

fn is_definition<N: SyntaxNode>(node: &N) -> bool {
    matches!(
        node.canonical_kind(),
        CanonicalKind::SubqueryAlias | CanonicalKind::CteDef
    )
}

/// Name of an aliased node: its own text, or the text of its last
/// childless child.
fn alias_of<N: SyntaxNode>(node: &N) -> Option<&str> {
    non_empty(node.text()).or_else(|| {
        node.children()
            .iter()
            .rev()
            .filter(|child| child.is_leaf())
            .find_map(|child| non_empty(child.text()))
    })
}

/// An alias wrapped around a plain table rather than a subquery
fn aliases_relation<N: SyntaxNode>(node: &N) -> bool {
    let mut inner = node.children().iter().filter(|child| !child.is_leaf());
    matches!(
        inner.next().map(|child| child.canonical_kind()),
        Some(CanonicalKind::TableRef | CanonicalKind::Table)
    ) && inner.next().is_none()
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

fn skip(fragment: MalformedTree) {
    log::debug!("skipping malformed fragment: {}", fragment);
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
