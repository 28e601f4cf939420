//! The physical operator tree.
//!
//! Every operator follows the same lifecycle: `open` once, `next` until it
//! returns `Ok(None)`, then `close` once. The transaction is not owned by
//! the tree; it is lent to each call through the [`ExecContext`].

use std::fmt;

use quarry_common::error::QuarryResult;

use super::delete::DeletePhysicalOperator;
use super::explain::{ExplainPhysicalOperator, EXPLAIN_COLUMN};
use super::insert::InsertPhysicalOperator;
use super::join::NestedLoopJoinOperator;
use super::predicate::PredicatePhysicalOperator;
use super::project::ProjectPhysicalOperator;
use super::scan::TableScanOperator;
use super::update::UpdatePhysicalOperator;
use crate::expr::Tuple;
use crate::trx::ExecContext;

/// An executable operator.
#[derive(Debug)]
pub enum PhysicalOperator {
    /// Sequential table scan.
    TableScan(TableScanOperator),
    /// Filter.
    Predicate(PredicatePhysicalOperator),
    /// Projection.
    Project(ProjectPhysicalOperator),
    /// Nested loop join.
    NestedLoopJoin(NestedLoopJoinOperator),
    /// Single-row insert.
    Insert(InsertPhysicalOperator),
    /// Update.
    Update(UpdatePhysicalOperator),
    /// Delete.
    Delete(DeletePhysicalOperator),
    /// Plan description.
    Explain(ExplainPhysicalOperator),
}

impl PhysicalOperator {
    /// Prepares the operator and its children for `next`.
    pub fn open(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        match self {
            PhysicalOperator::TableScan(op) => op.open(ctx),
            PhysicalOperator::Predicate(op) => op.open(ctx),
            PhysicalOperator::Project(op) => op.open(ctx),
            PhysicalOperator::NestedLoopJoin(op) => op.open(ctx),
            PhysicalOperator::Insert(op) => op.open(ctx),
            PhysicalOperator::Update(op) => op.open(ctx),
            PhysicalOperator::Delete(op) => op.open(ctx),
            PhysicalOperator::Explain(op) => op.open(ctx),
        }
    }

    /// Produces the next tuple, or `None` at end-of-stream.
    pub fn next(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<Option<Tuple>> {
        match self {
            PhysicalOperator::TableScan(op) => op.next(ctx),
            PhysicalOperator::Predicate(op) => op.next(ctx),
            PhysicalOperator::Project(op) => op.next(ctx),
            PhysicalOperator::NestedLoopJoin(op) => op.next(ctx),
            PhysicalOperator::Insert(op) => op.next(ctx),
            PhysicalOperator::Update(op) => op.next(ctx),
            PhysicalOperator::Delete(op) => op.next(ctx),
            PhysicalOperator::Explain(op) => op.next(ctx),
        }
    }

    /// Releases the operator and its children.
    pub fn close(&mut self, ctx: &mut ExecContext<'_>) -> QuarryResult<()> {
        match self {
            PhysicalOperator::TableScan(op) => op.close(ctx),
            PhysicalOperator::Predicate(op) => op.close(ctx),
            PhysicalOperator::Project(op) => op.close(ctx),
            PhysicalOperator::NestedLoopJoin(op) => op.close(ctx),
            PhysicalOperator::Insert(op) => op.close(ctx),
            PhysicalOperator::Update(op) => op.close(ctx),
            PhysicalOperator::Delete(op) => op.close(ctx),
            PhysicalOperator::Explain(op) => op.close(ctx),
        }
    }

    /// Returns the child operators.
    pub fn children(&self) -> Vec<&PhysicalOperator> {
        match self {
            PhysicalOperator::TableScan(_) | PhysicalOperator::Insert(_) => vec![],
            PhysicalOperator::Predicate(op) => vec![op.child()],
            PhysicalOperator::Project(op) => vec![op.child()],
            PhysicalOperator::NestedLoopJoin(op) => vec![op.left(), op.right()],
            PhysicalOperator::Update(op) => vec![op.child()],
            PhysicalOperator::Delete(op) => vec![op.child()],
            PhysicalOperator::Explain(op) => vec![op.child()],
        }
    }

    /// Returns the operator name.
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalOperator::TableScan(_) => "TableScan",
            PhysicalOperator::Predicate(_) => "Predicate",
            PhysicalOperator::Project(_) => "Project",
            PhysicalOperator::NestedLoopJoin(_) => "NestedLoopJoin",
            PhysicalOperator::Insert(_) => "Insert",
            PhysicalOperator::Update(_) => "Update",
            PhysicalOperator::Delete(_) => "Delete",
            PhysicalOperator::Explain(_) => "Explain",
        }
    }

    /// Returns the names of the columns this operator produces.
    pub fn header(&self) -> Vec<String> {
        match self {
            PhysicalOperator::TableScan(op) => op
                .table()
                .meta()
                .user_fields()
                .iter()
                .map(|f| f.name().to_string())
                .collect(),
            PhysicalOperator::Predicate(op) => op.child().header(),
            PhysicalOperator::Project(op) => op.header(),
            PhysicalOperator::NestedLoopJoin(op) => {
                let mut header = op.left().header();
                header.extend(op.right().header());
                header
            }
            PhysicalOperator::Insert(_)
            | PhysicalOperator::Update(_)
            | PhysicalOperator::Delete(_) => vec![],
            PhysicalOperator::Explain(_) => vec![EXPLAIN_COLUMN.to_string()],
        }
    }

    /// Renders the tree, one operator per line, children indented.
    pub fn format_tree(&self) -> String {
        let mut output = String::new();
        format_node(self, 0, &mut output);
        output
    }
}

fn format_node(op: &PhysicalOperator, indent: usize, output: &mut String) {
    output.push_str(&"  ".repeat(indent));
    output.push_str(&op.to_string());
    output.push('\n');
    for child in op.children() {
        format_node(child, indent + 1, output);
    }
}

impl fmt::Display for PhysicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalOperator::TableScan(op) => {
                write!(f, "TableScan: {}", op.table().name())?;
                if !op.readonly() {
                    write!(f, " (for write)")?;
                }
                if !op.predicates().is_empty() {
                    let preds: Vec<_> = op.predicates().iter().map(ToString::to_string).collect();
                    write!(f, " (filters: {})", preds.join(" AND "))?;
                }
                Ok(())
            }
            PhysicalOperator::Predicate(op) => write!(f, "Predicate: {}", op.expression()),
            PhysicalOperator::Project(op) => {
                let specs: Vec<_> = op.specs().iter().map(ToString::to_string).collect();
                write!(f, "Project: {}", specs.join(", "))
            }
            PhysicalOperator::NestedLoopJoin(_) => write!(f, "NestedLoopJoin"),
            PhysicalOperator::Insert(op) => {
                let values: Vec<_> = op.values().iter().map(ToString::to_string).collect();
                write!(f, "Insert: {} ({})", op.table().name(), values.join(", "))
            }
            PhysicalOperator::Update(op) => {
                let sets: Vec<_> = op.assignments().iter().map(ToString::to_string).collect();
                write!(f, "Update: {} SET {}", op.table().name(), sets.join(", "))
            }
            PhysicalOperator::Delete(op) => write!(f, "Delete: {}", op.table().name()),
            PhysicalOperator::Explain(_) => write!(f, "Explain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quarry_common::error::QuarryError;

    use crate::expr::{Expression, TupleCellSpec, ValueListTuple};
    use crate::physical::reconcile_record;
    use crate::stmt::{Assignment, CompOp, Field};
    use crate::storage::{AttrType, Db, FieldMeta, Table, Value};
    use crate::trx::VacuousTrx;

    fn table(db: &Db, name: &str, rows: i32) -> Arc<Table> {
        let table = db
            .create_table(
                name,
                vec![
                    FieldMeta::new("id", AttrType::Ints),
                    FieldMeta::new("name", AttrType::Chars),
                ],
            )
            .unwrap();
        for i in 0..rows {
            let mut record = table
                .make_record(&[Value::Int(0), Value::Int(i), Value::chars(format!("n{}", i))])
                .unwrap();
            table.insert_record(&mut record).unwrap();
        }
        table
    }

    fn field(table: &Arc<Table>, name: &str) -> Field {
        Field::new(Arc::clone(table), table.meta().find_field_by_name(name).unwrap().clone())
    }

    fn scan(table: &Arc<Table>) -> PhysicalOperator {
        PhysicalOperator::TableScan(TableScanOperator::new(Arc::clone(table), true, vec![]))
    }

    fn drain(op: &mut PhysicalOperator) -> QuarryResult<Vec<Tuple>> {
        let mut trx = VacuousTrx::default();
        let mut ctx = ExecContext::new(&mut trx);
        op.open(&mut ctx)?;
        let mut tuples = Vec::new();
        while let Some(tuple) = op.next(&mut ctx)? {
            tuples.push(tuple);
        }
        op.close(&mut ctx)?;
        Ok(tuples)
    }

    #[test]
    fn test_scan_applies_predicates() {
        let db = Db::default();
        let t = table(&db, "t", 5);
        let pred = Expression::comparison(
            CompOp::GtEq,
            Expression::field(field(&t, "id")),
            Expression::value(3),
        );
        let mut op =
            PhysicalOperator::TableScan(TableScanOperator::new(Arc::clone(&t), true, vec![pred]));

        let tuples = drain(&mut op).unwrap();
        assert_eq!(tuples.len(), 2);
        let ids: Vec<_> = tuples
            .iter()
            .map(|t| t.find_cell(&TupleCellSpec::new("t", "id")).cloned().unwrap())
            .collect();
        assert_eq!(ids, vec![Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn test_nested_loop_join_produces_cross_product() {
        let db = Db::default();
        let a = table(&db, "a", 3);
        let b = table(&db, "b", 2);
        let mut op = PhysicalOperator::NestedLoopJoin(NestedLoopJoinOperator::new(
            scan(&a),
            scan(&b),
        ));

        let tuples = drain(&mut op).unwrap();
        assert_eq!(tuples.len(), 6);
        assert!(tuples[0].find_cell(&TupleCellSpec::new("a", "id")).is_some());
        assert!(tuples[0].find_cell(&TupleCellSpec::new("b", "id")).is_some());
    }

    #[test]
    fn test_join_with_empty_side() {
        let db = Db::default();
        let a = table(&db, "a", 3);
        let b = table(&db, "b", 0);
        let mut op = PhysicalOperator::NestedLoopJoin(NestedLoopJoinOperator::new(
            scan(&a),
            scan(&b),
        ));
        assert!(drain(&mut op).unwrap().is_empty());
    }

    #[test]
    fn test_project_header() {
        let db = Db::default();
        let t = table(&db, "t", 1);
        let specs = vec![TupleCellSpec::new("t", "name")];

        let plain = ProjectPhysicalOperator::new(scan(&t), specs.clone(), false);
        assert_eq!(plain.header(), vec!["name".to_string()]);

        let mut qualified =
            PhysicalOperator::Project(ProjectPhysicalOperator::new(scan(&t), specs, true));
        assert_eq!(qualified.header(), vec!["t.name".to_string()]);

        let tuples = drain(&mut qualified).unwrap();
        assert_eq!(tuples[0].values(), vec![Value::chars("n0")]);
    }

    #[test]
    fn test_explain_reports_tree_without_running_child() {
        let db = Db::default();
        let t = table(&db, "t", 3);
        let insert = PhysicalOperator::Insert(InsertPhysicalOperator::new(
            Arc::clone(&t),
            vec![Value::Int(9), Value::chars("x")],
        ));
        let mut op = PhysicalOperator::Explain(ExplainPhysicalOperator::new(insert));
        assert_eq!(op.header(), vec![EXPLAIN_COLUMN.to_string()]);

        let tuples = drain(&mut op).unwrap();
        assert_eq!(tuples.len(), 1);
        let Some(Value::Chars(text)) = tuples[0].cell_at(0) else {
            panic!("explain should produce text");
        };
        assert!(text.starts_with("Insert: t"));
        assert_eq!(t.row_count(), 3);
    }

    #[test]
    fn test_format_tree_indents_children() {
        let db = Db::default();
        let a = table(&db, "a", 0);
        let b = table(&db, "b", 0);
        let op = PhysicalOperator::NestedLoopJoin(NestedLoopJoinOperator::new(
            scan(&a),
            scan(&b),
        ));
        assert_eq!(
            op.format_tree(),
            "NestedLoopJoin\n  TableScan: a\n  TableScan: b\n"
        );
    }

    #[test]
    fn test_update_rejects_non_row_input() {
        let db = Db::default();
        let t = table(&db, "t", 0);
        let source = PhysicalOperator::Explain(ExplainPhysicalOperator::new(scan(&t)));
        let mut op = PhysicalOperator::Update(UpdatePhysicalOperator::new(
            source,
            Arc::clone(&t),
            vec![Assignment::new("id", Value::Int(1))],
        ));

        let err = drain(&mut op).unwrap_err();
        assert!(matches!(err, QuarryError::Internal { .. }));
    }

    #[test]
    fn test_reconcile_keeps_system_and_unassigned_fields() {
        let db = Db::default();
        let t = db
            .create_table(
                "t",
                vec![
                    FieldMeta::new("b", AttrType::Ints),
                    FieldMeta::new("c", AttrType::Chars),
                ],
            )
            .unwrap();
        let tuple = Tuple::ValueList(ValueListTuple::new(
            vec![
                TupleCellSpec::new("t", "__trx_id"),
                TupleCellSpec::new("t", "b"),
                TupleCellSpec::new("t", "c"),
            ],
            vec![Value::Int(7), Value::Int(5), Value::chars("x")],
        ));

        let values =
            reconcile_record(&t, &[Assignment::new("c", Value::chars("y"))], &tuple).unwrap();
        assert_eq!(values, vec![Value::Int(7), Value::Int(5), Value::chars("y")]);
    }

    #[test]
    fn test_reconcile_never_assigns_system_fields() {
        let db = Db::default();
        let t = table(&db, "t", 0);
        let tuple = Tuple::ValueList(ValueListTuple::new(
            vec![
                TupleCellSpec::new("t", "__trx_id"),
                TupleCellSpec::new("t", "id"),
                TupleCellSpec::new("t", "name"),
            ],
            vec![Value::Int(7), Value::Int(5), Value::chars("x")],
        ));

        let assignments = [
            Assignment::new("__trx_id", Value::Int(99)),
            Assignment::new("id", Value::Int(6)),
        ];
        let values = reconcile_record(&t, &assignments, &tuple).unwrap();
        assert_eq!(values, vec![Value::Int(7), Value::Int(6), Value::chars("x")]);
    }

    #[test]
    fn test_reconcile_missing_field_is_type_mismatch() {
        let db = Db::default();
        let t = table(&db, "t", 0);
        let tuple = Tuple::ValueList(ValueListTuple::new(
            vec![TupleCellSpec::new("t", "id")],
            vec![Value::Int(1)],
        ));
        let err = reconcile_record(&t, &[], &tuple).unwrap_err();
        assert!(matches!(err, QuarryError::SchemaFieldTypeMismatch { .. }));
    }

    #[test]
    fn test_delete_drains_child() {
        let db = Db::default();
        let t = table(&db, "t", 4);
        let mut op =
            PhysicalOperator::Delete(DeletePhysicalOperator::new(scan(&t), Arc::clone(&t)));
        assert!(drain(&mut op).unwrap().is_empty());
        assert!(t.is_empty());
    }
}
