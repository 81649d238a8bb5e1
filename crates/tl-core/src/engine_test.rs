use super::*;
use crate::kind::CanonicalKind as K;
use crate::node::Node;

type N = Node<K>;

fn name(parts: &[&str]) -> N {
    Node::new(K::TableName).with_children(parts.iter().map(|p| Node::leaf(K::Other, *p)))
}

fn tab_ref(parts: &[&str]) -> N {
    Node::new(K::TableRef).with_child(name(parts))
}

fn aliased_ref(parts: &[&str], alias: &str) -> N {
    tab_ref(parts).with_child(Node::leaf(K::Other, alias))
}

fn destination(parts: &[&str]) -> N {
    Node::new(K::Destination).with_child(Node::new(K::Table).with_child(name(parts)))
}

/// Hive writes plain SELECT results to a temporary directory
fn tmp_destination() -> N {
    Node::new(K::Destination)
        .with_child(Node::new(K::Other).with_child(Node::leaf(K::Other, "TOK_TMP_FILE")))
}

fn other(children: Vec<N>) -> N {
    Node::new(K::Other).with_children(children)
}

fn query(children: Vec<N>) -> N {
    Node::new(K::Query).with_children(children)
}

fn select(children: Vec<N>) -> N {
    Node::new(K::Select).with_children(children)
}

fn join(children: Vec<N>) -> N {
    Node::new(K::Join).with_children(children)
}

fn insert(children: Vec<N>) -> N {
    Node::new(K::Insert).with_children(children)
}

fn col(text: &str) -> N {
    Node::leaf(K::Other, text)
}

/// Hive-shaped `SELECT ... FROM <parts>` sub-query block
fn simple_query(parts: &[&str]) -> N {
    query(vec![
        other(vec![tab_ref(parts)]),
        insert(vec![tmp_destination(), select(vec![col("*")])]),
    ])
}

fn cte_def_named(cte: &str, body: N) -> N {
    Node::new(K::CteDef).with_text(cte).with_child(body)
}

/// INSERT INTO db.target_table SELECT a.id, b.name FROM db1.source1 a
/// JOIN source2 b ON a.id=b.id WHERE a.age > (SELECT max(age) FROM db2.source3)
fn insert_select_tree() -> N {
    query(vec![
        other(vec![join(vec![
            aliased_ref(&["db1", "source1"], "a"),
            aliased_ref(&["source2"], "b"),
            other(vec![col("a.id"), col("b.id")]),
        ])]),
        insert(vec![
            destination(&["db", "target_table"]),
            select(vec![col("a.id"), col("b.name")]),
            other(vec![other(vec![
                col("a.age"),
                other(vec![simple_query(&["db2", "source3"])]),
            ])]),
        ]),
    ])
}

/// WITH cte AS (SELECT * FROM table3) SELECT * FROM table1 JOIN cte ON
/// table1.id=cte.id WHERE EXISTS (SELECT 1 FROM table2 WHERE table2.id=table1.id)
///
/// Hive places the CTE list after the main query body.
fn cte_tree() -> N {
    query(vec![
        other(vec![join(vec![
            tab_ref(&["table1"]),
            tab_ref(&["cte"]),
            other(vec![col("table1.id"), col("cte.id")]),
        ])]),
        insert(vec![
            tmp_destination(),
            select(vec![col("*")]),
            other(vec![other(vec![simple_query(&["table2"])])]),
        ]),
        Node::new(K::CteDef).with_child(
            Node::new(K::SubqueryAlias)
                .with_child(simple_query(&["table3"]))
                .with_child(col("cte")),
        ),
    ])
}

#[test]
fn test_insert_select_with_join_and_subquery() {
    let record = extract(&insert_select_tree());
    assert_eq!(record.target_names(), vec!["db.target_table"]);
    assert_eq!(
        record.source_names(),
        vec!["db1.source1", "source2", "db2.source3"]
    );
}

#[test]
fn test_cte_reference_is_not_a_source() {
    let record = extract(&cte_tree());
    let sources = record.source_names();
    assert!(sources.contains(&"table1"));
    assert!(sources.contains(&"table2"));
    assert!(sources.contains(&"table3"));
    assert!(!sources.contains(&"cte"));
    assert!(record.targets().is_empty());
}

#[test]
fn test_cte_reference_emitted_when_requested() {
    let extractor = LineageExtractor::new(ExtractOptions::default().emit_cte_names(true));
    let record = extractor.extract(&cte_tree());
    assert_eq!(
        record.source_names(),
        vec!["table1", "cte", "table2", "table3"]
    );
}

#[test]
fn test_self_join_recorded_once() {
    let tree = query(vec![other(vec![join(vec![
        aliased_ref(&["t"], "a"),
        aliased_ref(&["t"], "b"),
        other(vec![col("a.id"), col("b.id")]),
    ])])]);
    let record = extract(&tree);
    assert_eq!(record.source_names(), vec!["t"]);
}

#[test]
fn test_insert_without_destination_still_collects_sources() {
    let tree = insert(vec![
        query(vec![other(vec![tab_ref(&["s1"])])]),
        select(vec![other(vec![simple_query(&["s2"])])]),
    ]);
    let record = extract(&tree);
    assert!(record.targets().is_empty());
    assert_eq!(record.source_names(), vec!["s1", "s2"]);
}

#[test]
fn test_extraction_is_idempotent() {
    let tree = insert_select_tree();
    let extractor = LineageExtractor::default();
    assert_eq!(extractor.extract(&tree), extractor.extract(&tree));

    let tree = cte_tree();
    assert_eq!(extractor.extract(&tree), extractor.extract(&tree));
}

#[test]
fn test_same_table_read_and_written() {
    let tree = query(vec![
        other(vec![tab_ref(&["db", "events"])]),
        insert(vec![destination(&["db", "events"]), select(vec![col("*")])]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.target_names(), vec!["db.events"]);
    assert_eq!(record.source_names(), vec!["db.events"]);
}

#[test]
fn test_multi_insert_records_every_target() {
    let tree = query(vec![
        other(vec![tab_ref(&["src"])]),
        insert(vec![destination(&["out_a"]), select(vec![col("*")])]),
        insert(vec![destination(&["out_b"]), select(vec![col("*")])]),
        insert(vec![destination(&["out_a"]), select(vec![col("*")])]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.target_names(), vec!["out_a", "out_b"]);
    assert_eq!(record.source_names(), vec!["src"]);
}

#[test]
fn test_union_branches_are_sources() {
    let tree = Node::new(K::Union).with_children(vec![
        simple_query(&["a"]),
        simple_query(&["b"]),
        simple_query(&["a"]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.source_names(), vec!["a", "b"]);
}

#[test]
fn test_subquery_alias_in_from_is_source() {
    let tree = query(vec![other(vec![Node::new(K::SubqueryAlias)
        .with_child(simple_query(&["inner_t"]))
        .with_child(col("sub"))])]);
    let record = extract(&tree);
    assert_eq!(record.source_names(), vec!["inner_t"]);
}

#[test]
fn test_plan_shaped_insert_uses_relation_as_target() {
    // InsertIntoStatement(table = relation, query = Project(Join(...)))
    let tree = insert(vec![
        tab_ref(&["warehouse", "facts"]),
        other(vec![join(vec![tab_ref(&["a"]), tab_ref(&["b"])])]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.target_names(), vec!["warehouse.facts"]);
    assert_eq!(record.source_names(), vec!["a", "b"]);
}

#[test]
fn test_aliased_relation_under_insert_is_target() {
    let tree = insert(vec![
        Node::new(K::SubqueryAlias)
            .with_child(tab_ref(&["t"]))
            .with_child(col("x")),
        query(vec![tab_ref(&["s"])]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.target_names(), vec!["t"]);
    assert_eq!(record.source_names(), vec!["s"]);
}

#[test]
fn test_create_table_as_shape_with_direct_table_name() {
    // (TOK_CREATETABLE (TOK_TABNAME db t) TOK_LIKETABLE (TOK_QUERY ...))
    let tree = insert(vec![
        name(&["db", "t"]),
        col("TOK_LIKETABLE"),
        simple_query(&["db", "src"]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.target_names(), vec!["db.t"]);
    assert_eq!(record.source_names(), vec!["db.src"]);
}

#[test]
fn test_table_name_outside_target_context_is_ignored() {
    let tree = other(vec![name(&["not_a_reference"])]);
    assert!(extract(&tree).is_empty());
}

#[test]
fn test_table_ref_without_table_name_is_skipped() {
    let tree = query(vec![other(vec![
        Node::new(K::TableRef).with_child(col("alias_only")),
        tab_ref(&["kept"]),
    ])]);
    let record = extract(&tree);
    assert_eq!(record.source_names(), vec!["kept"]);
}

#[test]
fn test_empty_table_name_is_never_recorded() {
    let tree = query(vec![
        other(vec![tab_ref(&[]), tab_ref(&["kept"])]),
        insert(vec![destination(&[]), select(vec![col("*")])]),
    ]);
    let record = extract(&tree);
    assert!(record.targets().is_empty());
    assert_eq!(record.source_names(), vec!["kept"]);
}

#[test]
fn test_destination_without_table_name_is_skipped() {
    let tree = insert(vec![
        Node::new(K::Destination).with_child(Node::new(K::Table)),
        query(vec![tab_ref(&["s"])]),
    ]);
    let record = extract(&tree);
    assert!(record.targets().is_empty());
    assert_eq!(record.source_names(), vec!["s"]);
}

#[test]
fn test_cte_defined_by_own_text() {
    let tree = query(vec![
        cte_def_named("recent", simple_query(&["orders"])),
        other(vec![tab_ref(&["recent"]), tab_ref(&["customers"])]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.source_names(), vec!["orders", "customers"]);
}

#[test]
fn test_cte_defined_by_trailing_name_leaf() {
    let tree = query(vec![
        Node::new(K::CteDef)
            .with_child(simple_query(&["orders"]))
            .with_child(col("recent")),
        other(vec![tab_ref(&["recent"])]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.source_names(), vec!["orders"]);
}

#[test]
fn test_cte_list_defines_every_entry() {
    let tree = query(vec![
        other(vec![tab_ref(&["c1"]), tab_ref(&["c2"])]),
        Node::new(K::CteDef).with_children(vec![
            Node::new(K::SubqueryAlias)
                .with_child(simple_query(&["base1"]))
                .with_child(col("c1")),
            Node::new(K::SubqueryAlias)
                .with_child(simple_query(&["base2"]))
                .with_child(col("c2")),
        ]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.source_names(), vec!["base1", "base2"]);
}

#[test]
fn test_cte_lookup_ignores_case() {
    let tree = query(vec![
        cte_def_named("Recent", simple_query(&["orders"])),
        other(vec![tab_ref(&["RECENT"])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["orders"]);
}

#[test]
fn test_qualified_name_never_matches_cte() {
    let tree = query(vec![
        cte_def_named("recent", simple_query(&["orders"])),
        other(vec![tab_ref(&["db", "recent"])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["orders", "db.recent"]);
}

#[test]
fn test_cte_referenced_many_times_adds_nothing() {
    let tree = query(vec![
        cte_def_named("c", simple_query(&["base"])),
        other(vec![join(vec![
            aliased_ref(&["c"], "x"),
            aliased_ref(&["c"], "y"),
            other(vec![simple_query(&["c"])]),
        ])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["base"]);
}

#[test]
fn test_recursive_cte_self_reference_suppressed() {
    // WITH RECURSIVE r AS (SELECT * FROM seed UNION ALL SELECT * FROM r) SELECT * FROM r
    let body = Node::new(K::Union).with_children(vec![simple_query(&["seed"]), simple_query(&["r"])]);
    let tree = query(vec![
        Node::new(K::CteDef)
            .with_text(RECURSIVE_MARKER)
            .with_child(cte_def_named("r", query(vec![body]))),
        other(vec![tab_ref(&["r"])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["seed"]);
}

#[test]
fn test_non_recursive_cte_reads_table_of_same_name() {
    // WITH orders AS (SELECT * FROM orders WHERE x > 1) SELECT * FROM orders
    let tree = query(vec![
        cte_def_named("orders", simple_query(&["orders"])),
        other(vec![tab_ref(&["orders"])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["orders"]);

    let extractor = LineageExtractor::new(ExtractOptions::default().emit_cte_names(true));
    assert_eq!(extractor.extract(&tree).source_names(), vec!["orders"]);
}

#[test]
fn test_cte_body_sees_only_earlier_siblings() {
    // WITH a AS (SELECT * FROM b), b AS (SELECT * FROM c), d AS (SELECT * FROM a)
    // SELECT * FROM d
    let tree = query(vec![
        cte_def_named("a", simple_query(&["b"])),
        cte_def_named("b", simple_query(&["c"])),
        cte_def_named("d", simple_query(&["a"])),
        other(vec![tab_ref(&["d"])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["b", "c"]);
}

#[test]
fn test_hive_cte_list_bodies_see_only_earlier_entries() {
    // Hive prints the list after the body: TOK_CTE (TOK_SUBQUERY q name) ...
    let tree = query(vec![
        other(vec![tab_ref(&["c2"])]),
        Node::new(K::CteDef).with_children(vec![
            Node::new(K::SubqueryAlias)
                .with_child(simple_query(&["c2"]))
                .with_child(col("c1")),
            Node::new(K::SubqueryAlias)
                .with_child(simple_query(&["c1"]))
                .with_child(col("c2")),
        ]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["c2"]);
}

#[test]
fn test_cte_body_sees_outer_block_definitions() {
    let tree = query(vec![
        cte_def_named("outer_cte", simple_query(&["base"])),
        other(vec![query(vec![
            cte_def_named("inner_cte", simple_query(&["outer_cte"])),
            other(vec![tab_ref(&["inner_cte"])]),
        ])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["base"]);
}

#[test]
fn test_cte_def_outside_query_block() {
    let tree = Node::new(K::Root).with_children(vec![
        cte_def_named("c", simple_query(&["c"])),
        other(vec![tab_ref(&["c"])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["c"]);

    let tree = Node::new(K::Root).with_children(vec![
        cte_def_named("c", simple_query(&["base"])),
        other(vec![tab_ref(&["c"])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["base"]);
}

#[test]
fn test_cte_scope_is_limited_to_its_block() {
    // The first sub-query defines `x`; its sibling reads a real table `x`.
    let tree = query(vec![
        other(vec![query(vec![
            cte_def_named("x", simple_query(&["a"])),
            other(vec![tab_ref(&["x"])]),
        ])]),
        other(vec![query(vec![other(vec![tab_ref(&["x"])])])]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["a", "x"]);
}

#[test]
fn test_inner_cte_shadows_outer_only_inside_block() {
    let tree = query(vec![
        cte_def_named("c", simple_query(&["outer_base"])),
        other(vec![query(vec![
            cte_def_named("c", simple_query(&["inner_base"])),
            other(vec![tab_ref(&["c"])]),
        ])]),
        other(vec![tab_ref(&["c"])]),
    ]);
    let extractor = LineageExtractor::new(ExtractOptions::default().emit_cte_names(true));
    let record = extractor.extract(&tree);
    // With emission on, both references surface as `c`, once
    assert_eq!(record.source_names(), vec!["outer_base", "inner_base", "c"]);

    let record = extract(&tree);
    assert_eq!(record.source_names(), vec!["outer_base", "inner_base"]);
}

#[test]
fn test_cte_ref_node_only_recorded_when_emitting() {
    let tree = query(vec![
        cte_def_named("c", simple_query(&["base"])),
        Node::new(K::CteRef).with_text("c"),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["base"]);

    let extractor = LineageExtractor::new(ExtractOptions::default().emit_cte_names(true));
    assert_eq!(extractor.extract(&tree).source_names(), vec!["base", "c"]);
}

#[test]
fn test_cte_feeding_insert() {
    // WITH cte AS (SELECT * FROM src) INSERT INTO target SELECT * FROM cte
    let tree = query(vec![
        cte_def_named("cte", simple_query(&["src"])),
        insert(vec![destination(&["target"]), query(vec![tab_ref(&["cte"])])]),
    ]);
    let record = extract(&tree);
    assert_eq!(record.target_names(), vec!["target"]);
    assert_eq!(record.source_names(), vec!["src"]);
}

#[test]
fn test_root_and_other_recurse_everywhere() {
    let tree = Node::new(K::Root).with_children(vec![
        other(vec![other(vec![other(vec![simple_query(&["deep"])])])]),
        simple_query(&["shallow"]),
    ]);
    assert_eq!(extract(&tree).source_names(), vec!["deep", "shallow"]);
}

#[test]
fn test_no_duplicates_in_any_output() {
    let tree = Node::new(K::Root).with_children(vec![
        insert_select_tree(),
        insert_select_tree(),
        cte_tree(),
    ]);
    let record = extract(&tree);
    let mut sources = record.source_names();
    let total = sources.len();
    sources.sort();
    sources.dedup();
    assert_eq!(sources.len(), total);
    assert_eq!(record.target_names(), vec!["db.target_table"]);
}

#[test]
fn test_alias_of_prefers_own_text() {
    let node = Node::new(K::SubqueryAlias)
        .with_text("own")
        .with_child(col("leaf"));
    assert_eq!(alias_of(&node), Some("own"));

    let node = Node::new(K::SubqueryAlias)
        .with_child(simple_query(&["t"]))
        .with_child(col("leaf"));
    assert_eq!(alias_of(&node), Some("leaf"));

    let node = Node::new(K::SubqueryAlias).with_child(simple_query(&["t"]));
    assert_eq!(alias_of(&node), None);
}
