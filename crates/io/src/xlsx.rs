// Spreadsheet import (xlsx, xls, xlsb, ods) into raw cell grids
//
// One-way conversion: each worksheet becomes an untyped grid anchored at A1.
// No formatting, formulas or layout survive; only cached cell values.

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tripsheet_reconcile::model::{CellValue, RawGrid, Workbook};

/// Maximum number of cells to import (prevents DoS from huge files)
const MAX_CELLS: usize = 5_000_000;

/// Result of an import operation
#[derive(Debug, Default, Clone)]
pub struct ImportResult {
    /// Count of sheets imported
    pub sheets_imported: usize,
    /// Sheet names present in the file but not requested
    pub sheets_skipped: Vec<String>,
    /// Total non-empty cells imported
    pub cells_imported: usize,
    /// Whether the cell limit cut the import short
    pub truncated: bool,
    /// Actionable warnings
    pub warnings: Vec<String>,
    /// Total import duration in milliseconds
    pub import_duration_ms: u128,
}

impl ImportResult {
    pub fn summary(&self) -> String {
        let mut s = format!(
            "{} sheet(s), {} cell(s) in {}ms",
            self.sheets_imported, self.cells_imported, self.import_duration_ms
        );
        if self.truncated {
            s.push_str(" (truncated)");
        }
        s
    }
}

/// Import options
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Only read sheets with these exact names. `None` reads every sheet.
    pub only_sheets: Option<Vec<String>>,
}

/// Import every sheet of a spreadsheet file
pub fn import(path: &Path) -> Result<(Workbook, ImportResult), String> {
    import_with_options(path, &ImportOptions::default())
}

/// Import a spreadsheet file with options
pub fn import_with_options(
    path: &Path,
    options: &ImportOptions,
) -> Result<(Workbook, ImportResult), String> {
    let start_time = Instant::now();

    let mut source = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open workbook: {}", e))?;

    let mut result = ImportResult::default();
    let mut workbook = Workbook::new();
    let sheet_names: Vec<String> = source.sheet_names().to_vec();

    for sheet_name in &sheet_names {
        if let Some(ref wanted) = options.only_sheets {
            if !wanted.iter().any(|w| w == sheet_name) {
                result.sheets_skipped.push(sheet_name.clone());
                continue;
            }
        }

        if result.cells_imported >= MAX_CELLS {
            result.truncated = true;
            result.warnings.push(format!(
                "Sheet '{}' not read: {} cell limit reached",
                sheet_name, MAX_CELLS
            ));
            continue;
        }

        let range = source
            .worksheet_range(sheet_name)
            .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

        let budget = MAX_CELLS - result.cells_imported;
        let (grid, cells, truncated) = range_to_grid(&range, budget);
        if truncated {
            result.truncated = true;
            result.warnings.push(format!(
                "Sheet '{}' truncated at {} cells (limit reached)",
                sheet_name, MAX_CELLS
            ));
        }

        log::debug!(
            "{}: sheet '{}' {} row(s), {} cell(s)",
            path.display(),
            sheet_name,
            grid.len(),
            cells
        );

        result.cells_imported += cells;
        result.sheets_imported += 1;
        workbook.push(sheet_name.clone(), grid);
    }

    result.import_duration_ms = start_time.elapsed().as_millis();
    Ok((workbook, result))
}

/// Convert a calamine range into a grid anchored at A1.
///
/// Data may not begin at A1; the leading offset is padded with empty cells
/// so that column 0 of the grid is always column A of the sheet.
/// Returns the grid, the number of non-empty cells, and whether the cell
/// budget ran out.
fn range_to_grid(range: &Range<Data>, budget: usize) -> (RawGrid, usize, bool) {
    let mut grid: RawGrid = Vec::new();
    let Some((start_row, start_col)) = range.start() else {
        return (grid, 0, false);
    };

    for _ in 0..start_row {
        grid.push(Vec::new());
    }

    let mut cells = 0usize;
    let mut truncated = false;

    for row in range.rows() {
        let mut out = vec![CellValue::Empty; start_col as usize];
        out.reserve(row.len());
        for cell in row {
            let value = convert_cell(cell);
            if !matches!(value, CellValue::Empty) {
                if cells >= budget {
                    truncated = true;
                    break;
                }
                cells += 1;
            }
            out.push(value);
        }
        grid.push(out);
        if truncated {
            break;
        }
    }

    (grid, cells, truncated)
}

/// Map one calamine cell onto the engine's scalar model.
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Int(*n),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => {
            // Store error as text representation
            CellValue::Text(format!("#{:?}", e))
        }
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            // Durations and out-of-range serials keep their serial value
            None => CellValue::Number(dt.as_f64()),
        },
        // ISO strings are left for the date normalizer to parse
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
