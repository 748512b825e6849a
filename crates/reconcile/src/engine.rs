use serde::Serialize;

use crate::config::Profile;
use crate::error::ReconcileError;
use crate::fields::{resolve_fields, FieldPositionMap};
use crate::header::{header_labels, locate_header};
use crate::model::{
    OutputRecord, RawGrid, SheetReport, SheetStats, SheetStatus, Workbook, WorkbookOutcome,
};
use crate::project::{project_row, RowOutcome, SheetContext};

/// Header row, labels and resolved field positions of one sheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetLayout {
    pub family: String,
    pub header_row: usize,
    pub header: Vec<String>,
    pub fields: FieldPositionMap,
}

/// Reconcile every category sheet of one workbook, in profile order.
///
/// `source_name` is the workbook's file name; it feeds the cost-center rule.
/// Categories missing from the workbook and sheets without a header are
/// reported, not errors.
pub fn run(
    profile: &Profile,
    source_name: &str,
    workbook: &Workbook,
) -> Result<WorkbookOutcome, ReconcileError> {
    let mut outcome = WorkbookOutcome {
        source: source_name.to_string(),
        ..Default::default()
    };

    for category in &profile.sheet_order {
        let status = match workbook.sheet(category) {
            None => {
                log::debug!("{source_name}: no sheet '{category}'");
                SheetStatus::Missing
            }
            Some(grid) => reconcile_sheet(profile, category, source_name, grid, &mut outcome.records)?,
        };
        outcome.sheets.push(SheetReport {
            category: category.clone(),
            status,
        });
    }

    Ok(outcome)
}

/// Locate the header and resolve field positions for one category sheet.
/// `Ok(None)` when the grid has no header row.
pub fn layout(
    profile: &Profile,
    category: &str,
    grid: &RawGrid,
) -> Result<Option<SheetLayout>, ReconcileError> {
    let family = profile
        .family_for(category)
        .ok_or_else(|| ReconcileError::NoFamily(category.to_string()))?;

    let Some(header_row) = locate_header(grid, &profile.header_marker) else {
        return Ok(None);
    };

    let header = header_labels(&grid[header_row]);
    let fields = resolve_fields(&header, &family.fields, &profile.fallbacks);

    Ok(Some(SheetLayout {
        family: family.name.clone(),
        header_row,
        header,
        fields,
    }))
}

/// Project the data rows of one sheet, appending emitted records to `out`.
pub fn reconcile_sheet(
    profile: &Profile,
    category: &str,
    source_name: &str,
    grid: &RawGrid,
    out: &mut Vec<OutputRecord>,
) -> Result<SheetStatus, ReconcileError> {
    let Some(layout) = layout(profile, category, grid)? else {
        log::debug!("{source_name}: sheet '{category}' has no header row, skipped");
        return Ok(SheetStatus::NoHeader);
    };

    let unresolved = layout.fields.unresolved();
    if !unresolved.is_empty() {
        log::debug!(
            "{source_name}: sheet '{category}' has no column for {}",
            unresolved
                .iter()
                .map(|f| f.key())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let ctx = SheetContext {
        category,
        source_name,
        total_marker: &profile.total_marker,
        rule: &profile.cost_center,
        fields: &layout.fields,
    };

    let mut stats = SheetStats {
        family: layout.family.clone(),
        header_row: layout.header_row,
        unresolved_fields: unresolved,
        ..Default::default()
    };

    for row in &grid[layout.header_row + 1..] {
        stats.data_rows += 1;
        match project_row(&ctx, row) {
            RowOutcome::Emit(record) => {
                stats.emitted += 1;
                out.push(record);
            }
            RowOutcome::Excluded => stats.excluded += 1,
            RowOutcome::Skipped => stats.skipped += 1,
        }
    }

    log::debug!(
        "{source_name}: sheet '{category}' header at row {}, {} emitted, {} excluded, {} skipped",
        stats.header_row,
        stats.emitted,
        stats.excluded,
        stats.skipped,
    );

    Ok(SheetStatus::Processed(stats))
}
