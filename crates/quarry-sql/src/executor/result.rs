//! Materialized statement results.

use std::fmt;

use crate::storage::Value;

/// The rows produced by one statement.
///
/// Mutations and DDL produce no columns and no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlResult {
    /// Column names.
    pub header: Vec<String>,
    /// Result rows, each with one value per header column.
    pub rows: Vec<Vec<Value>>,
    /// Execution time in microseconds.
    pub execution_time_us: u64,
}

impl SqlResult {
    /// Creates a result.
    pub fn new(header: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            header,
            rows,
            execution_time_us: 0,
        }
    }

    /// Creates a result with no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pretty prints the result as a table.
    pub fn display(&self) -> String {
        let mut output = String::new();
        if self.header.is_empty() {
            return output;
        }

        let mut col_widths: Vec<usize> = self.header.iter().map(String::len).collect();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = col_widths.get_mut(i) {
                    *width = (*width).max(cell.len());
                }
            }
        }

        let line = |values: &[String], output: &mut String| {
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    output.push_str(" | ");
                }
                let width = col_widths.get(i).copied().unwrap_or(0);
                output.push_str(&format!("{:width$}", value, width = width));
            }
            output.push('\n');
        };

        line(&self.header, &mut output);
        for (i, width) in col_widths.iter().enumerate() {
            if i > 0 {
                output.push_str("-+-");
            }
            output.push_str(&"-".repeat(*width));
        }
        output.push('\n');
        for row in &cells {
            line(row, &mut output);
        }

        output.push_str(&format!("({} rows)\n", self.rows.len()));
        output
    }
}

impl fmt::Display for SqlResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
