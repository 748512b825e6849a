//! Header-row discovery.
//!
//! Expense exports prepend a variable number of title and merged-cell rows
//! before the real column labels. The header is the first row holding the
//! marker label in any column; failing that, the first row with at least
//! one non-empty cell. Whitespace-only text counts as content here.

use crate::model::{CellValue, RawGrid};

/// Index of the header row, or `None` when every row is empty.
pub fn locate_header(grid: &RawGrid, marker: &str) -> Option<usize> {
    grid.iter()
        .position(|row| row_contains_marker(row, marker))
        .or_else(|| grid.iter().position(|row| !row_is_empty(row)))
}

fn row_contains_marker(row: &[CellValue], marker: &str) -> bool {
    row.iter().any(|v| match v {
        CellValue::Empty => false,
        other => other.to_string().trim() == marker,
    })
}

fn row_is_empty(row: &[CellValue]) -> bool {
    row.iter().all(|v| matches!(v, CellValue::Empty))
}

/// Trimmed text labels of a header row.
pub fn header_labels(row: &[CellValue]) -> Vec<String> {
    row.iter().map(|v| v.to_string().trim().to_string()).collect()
}
