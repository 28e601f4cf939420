//! End-to-end tests for the query pipeline.
//!
//! Statements go from parsed nodes through resolution, planning, rewriting
//! and execution, under a transaction that records what it was asked to do.

use std::sync::Arc;

use quarry_common::config::QueryConfig;
use quarry_common::error::{QuarryError, QuarryResult};
use quarry_common::types::TrxId;
use quarry_sql::executor::{QueryEngine, SqlResult};
use quarry_sql::expr::Expression;
use quarry_sql::logical::{build_predicate, LogicalOperator, LogicalPlan, LogicalPlanBuilder};
use quarry_sql::optimizer::{RewriteRule, Rewriter};
use quarry_sql::physical::EXPLAIN_COLUMN;
use quarry_sql::stmt::{
    AssignmentSqlNode, AttrInfoSqlNode, CompOp, ConditionOperand, ConditionSqlNode,
    CreateTableSqlNode, DeleteSqlNode, FilterStmt, InsertSqlNode, RelAttrSqlNode, SelectSqlNode,
    SqlNode, Stmt, UpdateSqlNode,
};
use quarry_sql::storage::{AttrType, Record, Table, Value};
use quarry_sql::trx::{ExecContext, Trx, VacuousTrx};

/// Delegates to a `VacuousTrx` and counts every mutation.
#[derive(Debug, Default)]
struct RecordingTrx {
    inner: VacuousTrx,
    inserts: usize,
    deletes: usize,
    updates: usize,
    fail_update_at: Option<usize>,
}

impl RecordingTrx {
    fn failing_update_at(n: usize) -> Self {
        Self {
            fail_update_at: Some(n),
            ..Self::default()
        }
    }
}

impl Trx for RecordingTrx {
    fn id(&self) -> TrxId {
        self.inner.id()
    }

    fn insert_record(&mut self, table: &Table, record: &mut Record) -> QuarryResult<()> {
        self.inserts += 1;
        self.inner.insert_record(table, record)
    }

    fn delete_record(&mut self, table: &Table, record: &Record) -> QuarryResult<()> {
        self.deletes += 1;
        self.inner.delete_record(table, record)
    }

    fn update_record(
        &mut self,
        table: &Table,
        old: &Record,
        new: &mut Record,
    ) -> QuarryResult<()> {
        self.updates += 1;
        if self.fail_update_at == Some(self.updates) {
            return Err(QuarryError::internal("injected update failure"));
        }
        self.inner.update_record(table, old, new)
    }

    fn visit_record(&mut self, table: &Table, record: &Record, readonly: bool) -> QuarryResult<bool> {
        self.inner.visit_record(table, record, readonly)
    }

    fn commit(&mut self) -> QuarryResult<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> QuarryResult<()> {
        self.inner.rollback()
    }
}

/// Reports a change on every call, so the rewrite loop never settles.
#[derive(Debug)]
struct RestlessRule;

impl RewriteRule for RestlessRule {
    fn name(&self) -> &str {
        "restless"
    }

    fn rewrite(&self, op: LogicalOperator) -> QuarryResult<(LogicalOperator, bool)> {
        Ok((op, true))
    }
}

fn engine_with(config: QueryConfig) -> QueryEngine {
    let engine = QueryEngine::new(Arc::default(), config).unwrap();
    let mut trx = VacuousTrx::default();
    for name in ["a", "b", "c"] {
        let create = SqlNode::CreateTable(CreateTableSqlNode {
            relation_name: name.to_string(),
            attr_infos: vec![
                AttrInfoSqlNode {
                    name: "id".to_string(),
                    attr_type: AttrType::Ints,
                },
                AttrInfoSqlNode {
                    name: "name".to_string(),
                    attr_type: AttrType::Chars,
                },
            ],
        });
        engine.execute_sql_node(&create, &mut trx).unwrap();
    }
    engine
}

fn engine() -> QueryEngine {
    engine_with(QueryConfig::default())
}

fn insert(engine: &QueryEngine, table: &str, id: i32, name: &str) {
    let node = SqlNode::Insert(InsertSqlNode {
        relation_name: table.to_string(),
        values: vec![Value::Int(id), Value::chars(name)],
    });
    engine
        .execute_sql_node(&node, &mut VacuousTrx::default())
        .unwrap();
}

fn select(relations: &[&str], conditions: Vec<ConditionSqlNode>) -> SqlNode {
    SqlNode::Select(SelectSqlNode {
        attributes: vec![RelAttrSqlNode::star()],
        relations: relations.iter().map(|r| r.to_string()).collect(),
        conditions,
    })
}

fn id_eq(table: &str, id: i32) -> ConditionSqlNode {
    ConditionSqlNode::attr_value(RelAttrSqlNode::qualified(table, "id"), CompOp::Eq, id)
}

fn build(engine: &QueryEngine, node: &SqlNode) -> LogicalPlan {
    let stmt = Stmt::create(engine.db(), node).unwrap();
    LogicalPlanBuilder::new().build(&stmt).unwrap()
}

fn run(engine: &QueryEngine, node: &SqlNode) -> QuarryResult<SqlResult> {
    engine.execute_sql_node(node, &mut VacuousTrx::default())
}

fn scans(plan: &LogicalPlan) -> Vec<(String, bool)> {
    let mut scans = Vec::new();
    plan.walk(&mut |op| {
        if let LogicalOperator::TableGet(get) = op {
            scans.push((get.table.name().to_string(), get.readonly));
        }
    });
    scans
}

#[test]
fn test_select_scans_every_table_under_a_project() {
    let engine = engine();
    for relations in [&["a"][..], &["a", "b"], &["a", "b", "c"]] {
        let plan = build(&engine, &select(relations, vec![]));
        assert!(matches!(plan.root, LogicalOperator::Project(_)));
        assert_eq!(plan.count("TableGet"), relations.len());
        assert_eq!(plan.count("Join"), relations.len() - 1);
    }
}

#[test]
fn test_joins_are_left_deep() {
    let engine = engine();
    let plan = build(&engine, &select(&["a", "b", "c"], vec![]));

    let LogicalOperator::Project(project) = &plan.root else {
        panic!("root should be a project");
    };
    let LogicalOperator::Join(outer) = project.input.as_ref() else {
        panic!("project input should be a join");
    };
    assert!(matches!(outer.left.as_ref(), LogicalOperator::Join(_)));
    assert!(matches!(outer.right.as_ref(), LogicalOperator::TableGet(t) if t.table.name() == "c"));
    assert_eq!(
        scans(&plan).into_iter().map(|(t, _)| t).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
}

#[test]
fn test_mutation_scans_are_for_write() {
    let engine = engine();
    let nodes = [
        SqlNode::Delete(DeleteSqlNode {
            relation_name: "a".to_string(),
            conditions: vec![],
        }),
        SqlNode::Delete(DeleteSqlNode {
            relation_name: "a".to_string(),
            conditions: vec![id_eq("a", 1)],
        }),
        SqlNode::Update(UpdateSqlNode {
            relation_name: "a".to_string(),
            assignments: vec![AssignmentSqlNode {
                attribute_name: "name".to_string(),
                value: Value::chars("z"),
            }],
            conditions: vec![],
        }),
        SqlNode::Update(UpdateSqlNode {
            relation_name: "a".to_string(),
            assignments: vec![AssignmentSqlNode {
                attribute_name: "name".to_string(),
                value: Value::chars("z"),
            }],
            conditions: vec![id_eq("a", 1)],
        }),
    ];
    for node in &nodes {
        assert_eq!(scans(&build(&engine, node)), vec![("a".to_string(), false)]);
    }
}

#[test]
fn test_rewrite_reaches_stable_fixpoint() {
    let engine = engine();
    let node = select(
        &["a", "b"],
        vec![
            ConditionSqlNode::new(
                ConditionOperand::Value(Value::Int(1)),
                CompOp::Lt,
                ConditionOperand::Attr(RelAttrSqlNode::qualified("a", "id")),
            ),
            ConditionSqlNode::new(
                ConditionOperand::Value(Value::Int(1)),
                CompOp::Eq,
                ConditionOperand::Value(Value::Int(1)),
            ),
        ],
    );
    let rewriter = Rewriter::default();
    let rewritten = rewriter.rewrite(build(&engine, &node)).unwrap();
    assert_eq!(rewritten.count("Predicate"), 0);

    let (again, changed) = rewriter.rewrite_once(rewritten.clone()).unwrap();
    assert!(!changed);
    assert_eq!(again, rewritten);
}

#[test]
fn test_predicate_keeps_filter_order() {
    let engine = engine();
    let table = engine.db().find_table("a").unwrap();
    let conditions: Vec<_> = (0..4).map(|i| id_eq("a", i)).collect();
    let filter = FilterStmt::create(&[table], &conditions).unwrap();

    let predicate = build_predicate(&filter).unwrap();
    let literals: Vec<_> = predicate
        .conjuncts()
        .into_iter()
        .map(|c| match c {
            Expression::Comparison { right, .. } => right.try_get_value(),
            other => panic!("expected a comparison, got {}", other),
        })
        .collect();
    assert_eq!(
        literals,
        (0..4).map(|i| Some(Value::Int(i))).collect::<Vec<_>>()
    );
}

#[test]
fn test_single_table_conjuncts_move_into_scans() {
    let engine = engine();
    let node = select(
        &["a", "b"],
        vec![
            ConditionSqlNode::new(
                ConditionOperand::Value(Value::Int(1)),
                CompOp::Eq,
                ConditionOperand::Attr(RelAttrSqlNode::qualified("a", "id")),
            ),
            id_eq("b", 2),
        ],
    );
    let stmt = Stmt::create(engine.db(), &node).unwrap();
    let tree = engine.plan(&stmt).unwrap().format_tree();

    assert!(!tree.contains("Predicate"), "{}", tree);
    assert!(tree.contains("TableScan: a (filters: a.id = 1)"), "{}", tree);
    assert!(tree.contains("TableScan: b (filters: b.id = 2)"), "{}", tree);
}

#[test]
fn test_insert_writes_one_record_then_ends() {
    let engine = engine();
    let stmt = Stmt::create(
        engine.db(),
        &SqlNode::Insert(InsertSqlNode {
            relation_name: "a".to_string(),
            values: vec![Value::Int(1), Value::chars("foo")],
        }),
    )
    .unwrap();
    let mut root = engine.plan(&stmt).unwrap();
    let table = engine.db().find_table("a").unwrap();

    let mut trx = RecordingTrx::default();
    let mut ctx = ExecContext::new(&mut trx);
    root.open(&mut ctx).unwrap();
    assert!(root.next(&mut ctx).unwrap().is_none());
    assert_eq!(table.row_count(), 1);
    assert!(root.next(&mut ctx).unwrap().is_none());
    root.close(&mut ctx).unwrap();
    assert_eq!(trx.inserts, 1);

    let rows = run(&engine, &select(&["a"], vec![])).unwrap().rows;
    assert_eq!(rows, vec![vec![Value::Int(1), Value::chars("foo")]]);
}

#[test]
fn test_delete_touches_only_matching_rows() {
    let engine = engine();
    for (id, name) in [(1, "x"), (2, "y"), (1, "z"), (3, "x"), (4, "y")] {
        insert(&engine, "a", id, name);
    }
    let node = SqlNode::Delete(DeleteSqlNode {
        relation_name: "a".to_string(),
        conditions: vec![id_eq("a", 1)],
    });

    let mut trx = RecordingTrx::default();
    let result = engine.execute_sql_node(&node, &mut trx).unwrap();
    assert!(result.is_empty());
    assert_eq!(trx.deletes, 2);

    let names: Vec<_> = run(&engine, &select(&["a"], vec![]))
        .unwrap()
        .rows
        .into_iter()
        .map(|row| row[1].clone())
        .collect();
    assert_eq!(names, vec![Value::chars("y"), Value::chars("x"), Value::chars("y")]);
}

#[test]
fn test_update_replaces_only_assigned_fields() {
    let engine = engine();
    insert(&engine, "a", 5, "x");
    insert(&engine, "a", 6, "x");
    let table = engine.db().find_table("a").unwrap();
    let first = table.next_record(None).unwrap();
    let sys_before = table.record_values(&first).unwrap()[0].clone();

    let node = SqlNode::Update(UpdateSqlNode {
        relation_name: "a".to_string(),
        assignments: vec![AssignmentSqlNode {
            attribute_name: "name".to_string(),
            value: Value::chars("y"),
        }],
        conditions: vec![id_eq("a", 5)],
    });
    let mut trx = RecordingTrx::default();
    engine.execute_sql_node(&node, &mut trx).unwrap();
    assert_eq!(trx.updates, 1);

    let updated = table.get_record(first.rid()).unwrap();
    assert_eq!(
        table.record_values(&updated).unwrap(),
        vec![sys_before, Value::Int(5), Value::chars("y")]
    );
    let rows = run(&engine, &select(&["a"], vec![])).unwrap().rows;
    assert_eq!(rows[1], vec![Value::Int(6), Value::chars("x")]);
}

#[test]
fn test_update_failure_keeps_earlier_rows() {
    let engine = engine();
    for id in 0..3 {
        insert(&engine, "a", id, "old");
    }
    let node = SqlNode::Update(UpdateSqlNode {
        relation_name: "a".to_string(),
        assignments: vec![AssignmentSqlNode {
            attribute_name: "name".to_string(),
            value: Value::chars("new"),
        }],
        conditions: vec![],
    });

    let mut trx = RecordingTrx::failing_update_at(2);
    let err = engine.execute_sql_node(&node, &mut trx).unwrap_err();
    assert!(matches!(err, QuarryError::Internal { .. }));
    assert_eq!(trx.updates, 2);

    let names: Vec<_> = run(&engine, &select(&["a"], vec![]))
        .unwrap()
        .rows
        .into_iter()
        .map(|row| row[1].clone())
        .collect();
    assert_eq!(names, vec![Value::chars("new"), Value::chars("old"), Value::chars("old")]);
}

#[test]
fn test_update_of_unknown_column_fails_at_resolution() {
    let engine = engine();
    let node = SqlNode::Update(UpdateSqlNode {
        relation_name: "a".to_string(),
        assignments: vec![AssignmentSqlNode {
            attribute_name: "missing".to_string(),
            value: Value::Int(1),
        }],
        conditions: vec![],
    });
    let err = Stmt::create(engine.db(), &node).unwrap_err();
    assert!(matches!(err, QuarryError::SchemaFieldNotFound { .. }));
}

#[test]
fn test_join_select_returns_cross_product() {
    let engine = engine();
    insert(&engine, "a", 1, "a1");
    insert(&engine, "a", 2, "a2");
    insert(&engine, "b", 1, "b1");
    insert(&engine, "b", 2, "b2");
    insert(&engine, "b", 3, "b3");

    let all = run(&engine, &select(&["a", "b"], vec![])).unwrap();
    assert_eq!(all.row_count(), 6);
    assert_eq!(all.header, vec!["a.id", "a.name", "b.id", "b.name"]);

    let node = SqlNode::Select(SelectSqlNode {
        attributes: vec![
            RelAttrSqlNode::qualified("a", "name"),
            RelAttrSqlNode::qualified("b", "name"),
        ],
        relations: vec!["a".to_string(), "b".to_string()],
        conditions: vec![ConditionSqlNode::new(
            ConditionOperand::Attr(RelAttrSqlNode::qualified("a", "id")),
            CompOp::Eq,
            ConditionOperand::Attr(RelAttrSqlNode::qualified("b", "id")),
        )],
    });
    let matched = run(&engine, &node).unwrap();
    assert_eq!(
        matched.rows,
        vec![
            vec![Value::chars("a1"), Value::chars("b1")],
            vec![Value::chars("a2"), Value::chars("b2")],
        ]
    );
}

#[test]
fn test_explain_describes_plan_without_running_it() {
    let engine = engine();
    let node = SqlNode::Explain(Box::new(SqlNode::Delete(DeleteSqlNode {
        relation_name: "a".to_string(),
        conditions: vec![],
    })));
    insert(&engine, "a", 1, "keep");

    let result = run(&engine, &node).unwrap();
    assert_eq!(result.header, vec![EXPLAIN_COLUMN.to_string()]);
    assert_eq!(result.row_count(), 1);
    let Value::Chars(text) = &result.rows[0][0] else {
        panic!("explain should produce text");
    };
    assert_eq!(text, "Delete: a\n  TableScan: a (for write)\n");
    assert_eq!(engine.db().find_table("a").unwrap().row_count(), 1);
}

#[test]
fn test_nested_explain_is_unimplemented() {
    let engine = engine();
    let node = SqlNode::Explain(Box::new(SqlNode::Explain(Box::new(select(&["a"], vec![])))));
    let err = run(&engine, &node).unwrap_err();
    assert!(err.is_unimplemented());
}

#[test]
fn test_select_from_dropped_table_fails() {
    let engine = engine();
    let stmt = Stmt::create(engine.db(), &select(&["b"], vec![])).unwrap();
    engine.db().drop_table("b").unwrap();
    assert!(engine.db().find_table("b").is_none());

    // A resolved statement keeps its table handle.
    let result = engine.execute(&stmt, &mut VacuousTrx::default()).unwrap();
    assert!(result.is_empty());

    let err = run(&engine, &select(&["b"], vec![])).unwrap_err();
    assert!(matches!(err, QuarryError::SchemaTableNotFound { .. }));
}

#[test]
fn test_rewrite_that_never_settles_diverges() {
    let mut config = QueryConfig::default();
    config.rewrite.max_iterations = 4;
    let mut engine = engine_with(config);
    engine.add_rewrite_rule(Box::new(RestlessRule));

    let err = run(&engine, &select(&["a"], vec![])).unwrap_err();
    assert_eq!(err, QuarryError::RewriteDiverged { iterations: 4 });
}

#[test]
fn test_disabled_rules_keep_predicate() {
    let engine = engine_with(QueryConfig::minimal());
    insert(&engine, "a", 1, "x");
    insert(&engine, "a", 2, "y");

    let node = select(&["a"], vec![id_eq("a", 2)]);
    let stmt = Stmt::create(engine.db(), &node).unwrap();
    assert!(engine.plan(&stmt).unwrap().format_tree().contains("Predicate: (a.id = 2)"));
    assert_eq!(
        run(&engine, &node).unwrap().rows,
        vec![vec![Value::Int(2), Value::chars("y")]]
    );
}

#[test]
fn test_zero_rewrite_iterations_is_rejected() {
    let mut config = QueryConfig::default();
    config.rewrite.max_iterations = 0;
    let err = QueryEngine::new(Arc::default(), config).unwrap_err();
    assert!(matches!(err, QuarryError::InvalidConfig { .. }));
}

#[test]
fn test_repeated_table_in_from_is_rejected() {
    let engine = engine();
    insert(&engine, "a", 1, "n1");
    insert(&engine, "a", 2, "n2");

    let err = run(&engine, &select(&["a", "a"], vec![])).unwrap_err();
    assert!(matches!(err, QuarryError::InvalidArgument { .. }));
}
