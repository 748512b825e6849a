//! `tripsheet inspect`: show how the profile reads one workbook.

use std::path::PathBuf;

use serde::Serialize;
use tripsheet_io::discover::source_name;
use tripsheet_reconcile::engine::{layout, reconcile_sheet, SheetLayout};
use tripsheet_reconcile::fields::LogicalField;
use tripsheet_reconcile::model::SheetStatus;
use tripsheet_reconcile::{Profile, Workbook};

use crate::exit_codes::EXIT_PROFILE_INVALID;
use crate::profile::load_profile;
use crate::CliError;

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub file: String,
    pub profile: String,
    pub sheets: Vec<SheetInspection>,
    /// Sheets present in the workbook but not in the profile's sheet order.
    pub ignored_sheets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SheetInspection {
    pub category: String,
    #[serde(flatten)]
    pub status: SheetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<SheetLayout>,
}

pub fn cmd_inspect(file: PathBuf, profile: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let (profile, _) = load_profile(profile.as_deref())?;

    let (workbook, import) = tripsheet_io::xlsx::import(&file)
        .map_err(|e| CliError::io(format!("{}: {e}", file.display())))?;
    for warning in &import.warnings {
        log::warn!("{}: {warning}", file.display());
    }

    let report = inspect_workbook(&profile, &source_name(&file), &workbook)?;

    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{text}");
    } else {
        print_report(&report);
    }
    Ok(())
}

pub fn inspect_workbook(
    profile: &Profile,
    source: &str,
    workbook: &Workbook,
) -> Result<InspectReport, CliError> {
    let to_cli = |e: tripsheet_reconcile::ReconcileError| CliError {
        code: EXIT_PROFILE_INVALID,
        message: e.to_string(),
        hint: None,
    };

    let mut sheets = Vec::with_capacity(profile.sheet_order.len());
    for category in &profile.sheet_order {
        let Some(grid) = workbook.sheet(category) else {
            sheets.push(SheetInspection {
                category: category.clone(),
                status: SheetStatus::Missing,
                layout: None,
            });
            continue;
        };

        // Rows are counted but not kept.
        let mut scratch = Vec::new();
        let status = reconcile_sheet(profile, category, source, grid, &mut scratch).map_err(to_cli)?;
        let layout = layout(profile, category, grid).map_err(to_cli)?;
        sheets.push(SheetInspection {
            category: category.clone(),
            status,
            layout,
        });
    }

    let ignored_sheets = workbook
        .sheet_names()
        .filter(|name| !profile.sheet_order.iter().any(|c| c == name))
        .map(str::to_string)
        .collect();

    Ok(InspectReport {
        file: source.to_string(),
        profile: profile.name.clone(),
        sheets,
        ignored_sheets,
    })
}

fn print_report(report: &InspectReport) {
    println!("{} (profile: {})", report.file, report.profile);
    for sheet in &report.sheets {
        match (&sheet.status, &sheet.layout) {
            (SheetStatus::Missing, _) => println!("  {}: missing", sheet.category),
            (SheetStatus::NoHeader, _) => println!("  {}: no header row", sheet.category),
            (SheetStatus::Processed(stats), Some(layout)) => {
                println!(
                    "  {}: header on row {}, family '{}'",
                    sheet.category,
                    stats.header_row + 1,
                    stats.family
                );
                for field in LogicalField::ALL {
                    let columns = describe_sources(layout, field);
                    if !columns.is_empty() {
                        println!("    {:<20} {}", field.key(), columns);
                    }
                }
                if !stats.unresolved_fields.is_empty() {
                    let names: Vec<&str> = stats.unresolved_fields.iter().map(|f| f.key()).collect();
                    println!("    unresolved: {}", names.join(", "));
                }
                println!(
                    "    {} data row(s): {} emitted, {} excluded, {} skipped",
                    stats.data_rows, stats.emitted, stats.excluded, stats.skipped
                );
            }
            (SheetStatus::Processed(_), None) => println!("  {}: processed", sheet.category),
        }
    }
    if !report.ignored_sheets.is_empty() {
        println!("  ignored sheets: {}", report.ignored_sheets.join(", "));
    }
}

/// `B, E (then F)` for primary columns B and E with fallback column F.
fn describe_sources(layout: &SheetLayout, field: LogicalField) -> String {
    let mut sources = layout.fields.sources(field);
    let letters = |cols: &[usize]| cols.iter().map(|c| col_to_letter(*c)).collect::<Vec<_>>().join(", ");

    let mut out = sources.next().map(letters).unwrap_or_default();
    for fallback in sources.filter(|cols| !cols.is_empty()) {
        if out.is_empty() {
            out = letters(fallback);
        } else {
            out.push_str(&format!(" (then {})", letters(fallback)));
        }
    }
    out
}

/// Convert 0-indexed column to spreadsheet letter(s): 0 -> A, 25 -> Z, 26 -> AA.
fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}
