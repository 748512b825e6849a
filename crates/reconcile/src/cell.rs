//! Cell access with a single "nothing here" sentinel.
//!
//! A column that is not present in the sheet, an index past the end of a
//! ragged row, and a blank cell all read as the empty string. Callers cannot
//! tell these apart.

use crate::model::CellValue;

/// Cell at `col`, or `None` past the end of the row.
pub fn cell(row: &[CellValue], col: usize) -> Option<&CellValue> {
    row.get(col)
}

/// First non-blank cell among `cols`, tried in the given order.
pub fn first_non_blank<'r>(row: &'r [CellValue], cols: &[usize]) -> Option<&'r CellValue> {
    cols.iter()
        .filter_map(|&c| cell(row, c))
        .find(|v| !v.is_blank())
}

/// First non-blank cell across an ordered list of column sources.
///
/// Each source is itself a list of candidate columns; sources are evaluated
/// lazily and the walk stops at the first non-blank value.
pub fn first_non_blank_in<'r, 's, I>(row: &'r [CellValue], sources: I) -> Option<&'r CellValue>
where
    I: IntoIterator<Item = &'s [usize]>,
{
    sources.into_iter().find_map(|cols| first_non_blank(row, cols))
}

/// Stringified first non-blank value among `cols`, or `""`.
pub fn fetch_text(row: &[CellValue], cols: &[usize]) -> String {
    first_non_blank(row, cols)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    #[test]
    fn no_columns_reads_empty() {
        let r = row(&["a", "b"]);
        assert_eq!(fetch_text(&r, &[]), "");
    }

    #[test]
    fn out_of_range_reads_empty() {
        let r = row(&["a"]);
        assert_eq!(fetch_text(&r, &[5]), "");
    }

    #[test]
    fn first_non_blank_follows_candidate_order_not_column_order() {
        let r = row(&["left", "", "right"]);
        assert_eq!(fetch_text(&r, &[2, 0]), "right");
        assert_eq!(fetch_text(&r, &[1, 0, 2]), "left");
    }

    #[test]
    fn whitespace_only_counts_as_blank() {
        let r = row(&["  ", "x"]);
        assert_eq!(fetch_text(&r, &[0, 1]), "x");
    }

    #[test]
    fn numbers_are_stringified() {
        let r = vec![CellValue::Empty, CellValue::Number(1280.0)];
        assert_eq!(fetch_text(&r, &[0, 1]), "1280");
    }

    #[test]
    fn sources_short_circuit_on_first_hit() {
        let r = row(&["", "b", "c"]);
        let primary: &[usize] = &[0];
        let second: &[usize] = &[1];
        let third: &[usize] = &[2];
        let hit = first_non_blank_in(&r, [primary, second, third]);
        assert_eq!(hit, Some(&CellValue::Text("b".into())));
        assert_eq!(first_non_blank_in(&r, [primary]), None);
    }
}
