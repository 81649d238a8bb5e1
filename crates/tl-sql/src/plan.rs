//! Lowering of sqlparser statements into a lineage plan tree.
//!
//! The plan keeps only what decides lineage: the written table of each
//! statement, the relations read in `FROM`/`JOIN`, query blocks with their
//! CTE definitions, set operations, and subqueries found anywhere inside
//! expressions. Everything else is dropped.
//!
//! Write statements (`INSERT`, `UPDATE`, `DELETE`, `MERGE`, `CREATE TABLE`,
//! `CREATE VIEW`) lower to a node whose first child is the written table.
//! The relations they only read are gathered under one `Other` child, since
//! a relation placed directly under a write node would count as a target.

use std::iter;
use std::ops::ControlFlow;

use serde::Serialize;
use sqlparser::ast::{
    visit_relations, CreateView, Cte, Delete, FromTable, Insert, Join, Merge, ObjectName,
    ObjectNamePart, Query, Select, SetExpr, Statement, TableAlias, TableFactor, TableObject,
    TableWithJoins, Update, UpdateTableFromKind, Visit, Visitor,
};
use strum_macros::{Display, IntoStaticStr};
use tl_core::{CanonicalKind, NativeKind, Node, RECURSIVE_MARKER};

/// Node types of the lineage plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
pub enum PlanKind {
    /// All statements of one script
    Script,
    Insert,
    Update,
    Delete,
    Merge,
    CreateTableAs,
    CreateView,
    /// Write target clause of an insert or create
    InsertTarget,
    TargetTable,
    ObjectName,
    Ident,
    /// A named table read in `FROM` or `JOIN`
    Relation,
    Query,
    Select,
    Join,
    SetOperation,
    /// Subquery in `FROM`
    Derived,
    Cte,
    /// `WITH RECURSIVE` list of `Cte` nodes
    RecursiveWith,
    Values,
    /// Expression holding subqueries
    Expr,
    /// A statement kept only for the relations it mentions
    Statement,
    Other,
}

impl NativeKind for PlanKind {
    fn canonical(&self) -> CanonicalKind {
        match self {
            PlanKind::Script => CanonicalKind::Root,
            PlanKind::Insert
            | PlanKind::Update
            | PlanKind::Delete
            | PlanKind::Merge
            | PlanKind::CreateTableAs
            | PlanKind::CreateView => CanonicalKind::Insert,
            PlanKind::InsertTarget => CanonicalKind::Destination,
            PlanKind::TargetTable => CanonicalKind::Table,
            PlanKind::ObjectName => CanonicalKind::TableName,
            PlanKind::Relation => CanonicalKind::TableRef,
            PlanKind::Query => CanonicalKind::Query,
            PlanKind::Select => CanonicalKind::Select,
            PlanKind::Join => CanonicalKind::Join,
            PlanKind::SetOperation => CanonicalKind::Union,
            PlanKind::Derived => CanonicalKind::SubqueryAlias,
            PlanKind::Cte | PlanKind::RecursiveWith => CanonicalKind::CteDef,
            PlanKind::Ident
            | PlanKind::Values
            | PlanKind::Expr
            | PlanKind::Statement
            | PlanKind::Other => CanonicalKind::Other,
        }
    }
}

/// Plan tree node
pub type PlanNode = Node<PlanKind>;

/// Lower every statement of a script under one `Script` root
pub fn lower_statements(statements: &[Statement]) -> PlanNode {
    Node::new(PlanKind::Script).with_children(statements.iter().map(lower_statement))
}

/// Lower one statement
pub fn lower_statement(statement: &Statement) -> PlanNode {
    match statement {
        Statement::Query(query) => lower_query(query),
        Statement::Insert(insert) => lower_insert(insert),
        Statement::Update(update) => lower_update(update),
        Statement::Delete(delete) => lower_delete(delete),
        Statement::Merge(merge) => lower_merge(merge),
        Statement::CreateTable(create) => {
            let mut node =
                Node::new(PlanKind::CreateTableAs).with_child(insert_target(&create.name));
            if let Some(query) = &create.query {
                node.push(lower_query(query));
            }
            node
        }
        Statement::CreateView(view) => lower_create_view(view),
        other => {
            log::debug!("collecting relations of unsupported statement");
            Node::new(PlanKind::Statement).with_children(relations_of(other))
        }
    }
}

fn lower_insert(insert: &Insert) -> PlanNode {
    let mut node = Node::new(PlanKind::Insert);
    match &insert.table {
        TableObject::TableName(name) => node.push(insert_target(name)),
        _ => log::debug!("insert into a table function, no target"),
    }
    if let Some(source) = &insert.source {
        node.push(lower_query(source));
    }
    node
}

fn lower_update(update: &Update) -> PlanNode {
    let mut node = Node::new(PlanKind::Update);
    let mut reads = Vec::new();
    match &update.table.relation {
        TableFactor::Table { name, .. } => node.push(insert_target(name)),
        other => {
            log::debug!("update of a non-table relation, no target");
            reads.push(lower_table_factor(other));
        }
    }
    reads.extend(update.table.joins.iter().map(lower_join));
    if let Some(UpdateTableFromKind::BeforeSet(from) | UpdateTableFromKind::AfterSet(from)) =
        &update.from
    {
        reads.extend(from.iter().map(lower_table_with_joins));
    }
    reads.extend(subqueries(&update.assignments));
    reads.extend(subqueries(&update.selection));
    node.with_child(Node::new(PlanKind::Other).with_children(reads))
}

/// `DELETE FROM t ...` writes `t`. The multi-table form `DELETE a, b FROM
/// ...` writes the listed tables, which may be aliases of `FROM` relations.
fn lower_delete(delete: &Delete) -> PlanNode {
    let from = match &delete.from {
        FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
    };
    let mut node = Node::new(PlanKind::Delete);
    let mut reads = Vec::new();

    if delete.tables.is_empty() {
        for table in from {
            match &table.relation {
                TableFactor::Table { name, .. } => node.push(insert_target(name)),
                other => reads.push(lower_table_factor(other)),
            }
            reads.extend(table.joins.iter().map(lower_join));
        }
    } else {
        let is_written = |factor: &TableFactor| {
            delete
                .tables
                .iter()
                .any(|listed| deleted_table(factor, listed).is_some())
        };
        let factors: Vec<&TableFactor> = from
            .iter()
            .flat_map(|table| {
                iter::once(&table.relation).chain(table.joins.iter().map(|join| &join.relation))
            })
            .collect();
        for listed in &delete.tables {
            let written = factors
                .iter()
                .find_map(|factor| deleted_table(factor, listed))
                .unwrap_or(listed);
            node.push(insert_target(written));
        }
        for table in from {
            if !is_written(&table.relation) {
                reads.push(lower_table_factor(&table.relation));
            }
            for join in &table.joins {
                if is_written(&join.relation) {
                    reads.extend(subqueries(&join.join_operator));
                } else {
                    reads.push(lower_join(join));
                }
            }
        }
    }

    if let Some(using) = &delete.using {
        reads.extend(using.iter().map(lower_table_with_joins));
    }
    reads.extend(subqueries(&delete.selection));
    reads.extend(subqueries(&delete.order_by));
    node.with_child(Node::new(PlanKind::Other).with_children(reads))
}

/// Name of the table `factor` reads when `listed` refers to it by name or
/// by alias
fn deleted_table<'q>(factor: &'q TableFactor, listed: &ObjectName) -> Option<&'q ObjectName> {
    let TableFactor::Table { name, alias, .. } = factor else {
        return None;
    };
    let by_alias = match (alias, listed.0.as_slice()) {
        (Some(alias), [part]) => part
            .as_ident()
            .is_some_and(|ident| ident.value == alias.name.value),
        _ => false,
    };
    (name == listed || by_alias).then_some(name)
}

fn lower_merge(merge: &Merge) -> PlanNode {
    let mut node = Node::new(PlanKind::Merge);
    let mut reads = Vec::new();
    match &merge.table {
        TableFactor::Table { name, .. } => node.push(insert_target(name)),
        other => {
            log::debug!("merge into a non-table relation, no target");
            reads.push(lower_table_factor(other));
        }
    }
    reads.push(lower_table_factor(&merge.source));
    reads.extend(subqueries(&merge.on));
    reads.extend(subqueries(&merge.clauses));
    node.with_child(Node::new(PlanKind::Other).with_children(reads))
}

fn lower_create_view(view: &CreateView) -> PlanNode {
    Node::new(PlanKind::CreateView)
        .with_child(insert_target(&view.name))
        .with_child(lower_query(&view.query))
}

fn insert_target(name: &ObjectName) -> PlanNode {
    Node::new(PlanKind::InsertTarget)
        .with_child(Node::new(PlanKind::TargetTable).with_child(object_name(name)))
}

/// `ObjectName` with one `Ident` leaf per part, quotes removed
fn object_name(name: &ObjectName) -> PlanNode {
    Node::new(PlanKind::ObjectName).with_children(name.0.iter().map(|part| {
        let text = match part {
            ObjectNamePart::Identifier(ident) => ident.value.clone(),
            other => other.to_string(),
        };
        Node::leaf(PlanKind::Ident, text)
    }))
}

fn lower_query(query: &Query) -> PlanNode {
    let mut node = Node::new(PlanKind::Query);
    if let Some(with) = &query.with {
        let ctes = with.cte_tables.iter().map(lower_cte);
        if with.recursive {
            node.push(
                Node::new(PlanKind::RecursiveWith)
                    .with_text(RECURSIVE_MARKER)
                    .with_children(ctes),
            );
        } else {
            node = node.with_children(ctes);
        }
    }
    node.push(lower_set_expr(&query.body));
    node.with_children(subqueries(&query.order_by))
}

fn lower_cte(cte: &Cte) -> PlanNode {
    Node::new(PlanKind::Cte)
        .with_text(cte.alias.name.value.clone())
        .with_child(lower_query(&cte.query))
}

fn lower_set_expr(body: &SetExpr) -> PlanNode {
    match body {
        SetExpr::Select(select) => lower_select(select),
        SetExpr::Query(query) => lower_query(query),
        SetExpr::SetOperation { left, right, .. } => Node::new(PlanKind::SetOperation)
            .with_child(lower_set_expr(left))
            .with_child(lower_set_expr(right)),
        SetExpr::Insert(statement) => lower_statement(statement),
        SetExpr::Values(values) => Node::new(PlanKind::Values).with_children(subqueries(values)),
        other => Node::new(PlanKind::Other).with_children(relations_of(other)),
    }
}

fn lower_select(select: &Select) -> PlanNode {
    let mut node = Node::new(PlanKind::Select);
    for table in &select.from {
        node.push(lower_table_with_joins(table));
    }
    node.with_children(subqueries(&select.projection))
        .with_children(subqueries(&select.selection))
        .with_children(subqueries(&select.group_by))
        .with_children(subqueries(&select.having))
        .with_children(subqueries(&select.qualify))
}

fn lower_table_with_joins(table: &TableWithJoins) -> PlanNode {
    let relation = lower_table_factor(&table.relation);
    if table.joins.is_empty() {
        return relation;
    }
    let mut node = Node::new(PlanKind::Join).with_child(relation);
    for join in &table.joins {
        node.push(lower_join(join));
    }
    node
}

/// Joined relation, followed by the subqueries of its join constraint
fn lower_join(join: &Join) -> PlanNode {
    let relation = lower_table_factor(&join.relation);
    let constraint = subqueries(&join.join_operator);
    if constraint.is_empty() {
        relation
    } else {
        Node::new(PlanKind::Other)
            .with_child(relation)
            .with_children(constraint)
    }
}

fn lower_table_factor(factor: &TableFactor) -> PlanNode {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            with_alias(Node::new(PlanKind::Relation).with_child(object_name(name)), alias)
        }
        TableFactor::Derived {
            subquery, alias, ..
        } => with_alias(
            Node::new(PlanKind::Derived).with_child(lower_query(subquery)),
            alias,
        ),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => lower_table_with_joins(table_with_joins),
        other => Node::new(PlanKind::Other).with_children(relations_of(other)),
    }
}

fn with_alias(node: PlanNode, alias: &Option<TableAlias>) -> PlanNode {
    match alias {
        Some(alias) => node.with_child(Node::leaf(PlanKind::Ident, alias.name.value.clone())),
        None => node,
    }
}

/// Every relation mentioned anywhere under `node`, as flat `Relation` nodes
fn relations_of<V: Visit>(node: &V) -> Vec<PlanNode> {
    let mut relations = Vec::new();
    let _ = visit_relations(node, |name| {
        relations.push(Node::new(PlanKind::Relation).with_child(object_name(name)));
        ControlFlow::<()>::Continue(())
    });
    relations
}

/// Lowers the outermost queries met while visiting an AST fragment.
///
/// Queries nested inside an already collected query are lowered as part of
/// it, not collected again.
#[derive(Default)]
struct SubqueryCollector {
    depth: usize,
    found: Vec<PlanNode>,
}

impl Visitor for SubqueryCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if self.depth == 0 {
            self.found.push(lower_query(query));
        }
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.depth -= 1;
        ControlFlow::Continue(())
    }
}

/// Subqueries found in `fragment`, each wrapped in an `Expr` node
fn subqueries<V: Visit>(fragment: &V) -> Vec<PlanNode> {
    let mut collector = SubqueryCollector::default();
    let _ = fragment.visit(&mut collector);
    collector
        .found
        .into_iter()
        .map(|query| Node::new(PlanKind::Expr).with_child(query))
        .collect()
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
