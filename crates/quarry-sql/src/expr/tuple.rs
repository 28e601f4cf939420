//! Tuples produced by the physical operators.
//!
//! A tuple is a view that can look up a cell by `(table, field)` identity.
//! The variants form a closed set, so operators that need the backing
//! record of a row match on [`Tuple::Row`] instead of casting.

use std::fmt;
use std::sync::Arc;

use quarry_common::error::QuarryResult;

use crate::stmt::Field;
use crate::storage::{Record, Table, Value};

/// Identity of a cell: table name plus field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleCellSpec {
    table_name: String,
    field_name: String,
}

impl TupleCellSpec {
    /// Creates a cell spec.
    pub fn new(table_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            field_name: field_name.into(),
        }
    }

    /// Creates a spec that belongs to no table.
    pub fn unqualified(field_name: impl Into<String>) -> Self {
        Self::new(String::new(), field_name)
    }

    /// Returns the table name. Empty for computed cells.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the field name.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }
}

impl From<&Field> for TupleCellSpec {
    fn from(field: &Field) -> Self {
        Self::new(field.table_name(), field.field_name())
    }
}

impl fmt::Display for TupleCellSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.table_name.is_empty() {
            write!(f, "{}", self.field_name)
        } else {
            write!(f, "{}.{}", self.table_name, self.field_name)
        }
    }
}

/// One stored row, decoded once on construction.
///
/// Every field of the table is visible, system fields included.
#[derive(Debug, Clone)]
pub struct RowTuple {
    table: Arc<Table>,
    record: Record,
    values: Vec<Value>,
}

impl RowTuple {
    /// Decodes `record` of `table`.
    pub fn new(table: Arc<Table>, record: Record) -> QuarryResult<Self> {
        let values = table.record_values(&record)?;
        Ok(Self {
            table,
            record,
            values,
        })
    }

    /// Returns the table.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Returns the backing record.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Returns all values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn find_cell(&self, spec: &TupleCellSpec) -> Option<&Value> {
        if spec.table_name() != self.table.name() {
            return None;
        }
        self.table
            .meta()
            .field_index(spec.field_name())
            .and_then(|i| self.values.get(i))
    }
}

/// A projection over a child tuple.
#[derive(Debug, Clone)]
pub struct ProjectTuple {
    specs: Arc<[TupleCellSpec]>,
    child: Box<Tuple>,
}

impl ProjectTuple {
    /// Projects `child` onto `specs`.
    pub fn new(specs: Arc<[TupleCellSpec]>, child: Tuple) -> Self {
        Self {
            specs,
            child: Box::new(child),
        }
    }

    /// Returns the projected cell specs.
    pub fn specs(&self) -> &[TupleCellSpec] {
        &self.specs
    }

    /// Returns the underlying tuple.
    pub fn child(&self) -> &Tuple {
        &self.child
    }
}

/// The concatenation of two tuples.
#[derive(Debug, Clone)]
pub struct JoinedTuple {
    left: Box<Tuple>,
    right: Box<Tuple>,
}

impl JoinedTuple {
    /// Joins two tuples.
    pub fn new(left: Tuple, right: Tuple) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Returns the left side.
    pub fn left(&self) -> &Tuple {
        &self.left
    }

    /// Returns the right side.
    pub fn right(&self) -> &Tuple {
        &self.right
    }
}

/// A free-standing list of named values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueListTuple {
    specs: Vec<TupleCellSpec>,
    values: Vec<Value>,
}

impl ValueListTuple {
    /// Creates a value list. `specs` and `values` pair up by position.
    pub fn new(specs: Vec<TupleCellSpec>, values: Vec<Value>) -> Self {
        Self { specs, values }
    }

    /// Returns the values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// A tuple.
#[derive(Debug, Clone)]
pub enum Tuple {
    /// A stored row.
    Row(RowTuple),
    /// A projection.
    Project(ProjectTuple),
    /// A join result.
    Joined(JoinedTuple),
    /// Computed values.
    ValueList(ValueListTuple),
}

impl Tuple {
    /// Returns the number of cells.
    pub fn cell_num(&self) -> usize {
        match self {
            Tuple::Row(row) => row.values.len(),
            Tuple::Project(project) => project.specs.len(),
            Tuple::Joined(joined) => joined.left.cell_num() + joined.right.cell_num(),
            Tuple::ValueList(list) => list.values.len(),
        }
    }

    /// Returns the cell at `index`.
    pub fn cell_at(&self, index: usize) -> Option<&Value> {
        match self {
            Tuple::Row(row) => row.values.get(index),
            Tuple::Project(project) => project
                .specs
                .get(index)
                .and_then(|spec| project.child.find_cell(spec)),
            Tuple::Joined(joined) => {
                let left_num = joined.left.cell_num();
                if index < left_num {
                    joined.left.cell_at(index)
                } else {
                    joined.right.cell_at(index - left_num)
                }
            }
            Tuple::ValueList(list) => list.values.get(index),
        }
    }

    /// Looks up a cell by identity.
    pub fn find_cell(&self, spec: &TupleCellSpec) -> Option<&Value> {
        match self {
            Tuple::Row(row) => row.find_cell(spec),
            Tuple::Project(project) => project.child.find_cell(spec),
            Tuple::Joined(joined) => joined
                .left
                .find_cell(spec)
                .or_else(|| joined.right.find_cell(spec)),
            Tuple::ValueList(list) => list
                .specs
                .iter()
                .position(|s| s == spec)
                .and_then(|i| list.values.get(i)),
        }
    }

    /// Returns all cells in order.
    pub fn values(&self) -> Vec<Value> {
        (0..self.cell_num())
            .filter_map(|i| self.cell_at(i).cloned())
            .collect()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<_> = self.values().iter().map(ToString::to_string).collect();
        write!(f, "{}", cells.join(" | "))
    }
}
