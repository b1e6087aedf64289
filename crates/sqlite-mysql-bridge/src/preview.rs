//! Table preview data.

use serde::Serialize;

/// Column headers plus every row of one table, rendered as display strings.
///
/// The whole table is fetched with no row limit. Previewing a very large
/// table costs time and memory proportional to the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePreview {
    /// The previewed table's name.
    pub table: String,
    /// Column names, in declaration order.
    pub columns: Vec<String>,
    /// All rows, one display string per column.
    pub rows: Vec<Vec<String>>,
}

impl TablePreview {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
