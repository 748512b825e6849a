use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::fields::LogicalField;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single scalar cell as delivered by the container reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Empty, or text that trims to nothing.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            // Integers without decimals
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// Rows of cells, 0-indexed. Rows may be ragged; reads past the end are blank.
pub type RawGrid = Vec<Vec<CellValue>>;

/// One named sheet of a loaded workbook.
#[derive(Debug, Clone)]
pub struct Worksheet {
    pub name: String,
    pub grid: RawGrid,
}

/// All sheets of one spreadsheet container, in file order.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, grid: RawGrid) {
        self.sheets.push(Worksheet { name: name.into(), grid });
    }

    /// Lookup by exact sheet name.
    pub fn sheet(&self, name: &str) -> Option<&RawGrid> {
        self.sheets.iter().find(|s| s.name == name).map(|s| &s.grid)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Fixed output header, in column order.
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "product_type",
    "booking_date",
    "cost_center",
    "traveler_name",
    "itinerary_or_city",
    "flight_or_hotel",
    "travel_or_stay_date",
    "receivable",
    "trip_order",
    "note",
];

/// One normalized row. All fields are text; unresolved fields are blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRecord {
    pub product_type: String,
    pub booking_date: String,
    pub cost_center: String,
    pub traveler_name: String,
    pub itinerary_or_city: String,
    pub flight_or_hotel: String,
    pub travel_or_stay_date: String,
    pub receivable: String,
    pub trip_order: String,
    pub note: String,
}

impl OutputRecord {
    /// Field values in `OUTPUT_COLUMNS` order.
    pub fn fields(&self) -> [&str; 10] {
        [
            self.product_type.as_str(),
            self.booking_date.as_str(),
            self.cost_center.as_str(),
            self.traveler_name.as_str(),
            self.itinerary_or_city.as_str(),
            self.flight_or_hotel.as_str(),
            self.travel_or_stay_date.as_str(),
            self.receivable.as_str(),
            self.trip_order.as_str(),
            self.note.as_str(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub category: String,
    #[serde(flatten)]
    pub status: SheetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetStatus {
    /// The workbook has no sheet with this category label.
    Missing,
    /// The sheet exists but no header row could be located.
    NoHeader,
    Processed(SheetStats),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetStats {
    pub family: String,
    pub header_row: usize,
    /// Rows after the header row.
    pub data_rows: usize,
    pub emitted: usize,
    /// Rows dropped by the cost-center rule.
    pub excluded: usize,
    /// Blank and total rows.
    pub skipped: usize,
    pub unresolved_fields: Vec<LogicalField>,
}

/// Result of reconciling one source file.
#[derive(Debug, Clone, Default)]
pub struct WorkbookOutcome {
    pub source: String,
    pub records: Vec<OutputRecord>,
    pub sheets: Vec<SheetReport>,
}

impl WorkbookOutcome {
    pub fn processed_sheets(&self) -> usize {
        self.sheets
            .iter()
            .filter(|s| matches!(s.status, SheetStatus::Processed(_)))
            .count()
    }

    pub fn excluded_rows(&self) -> usize {
        self.sheets
            .iter()
            .map(|s| match &s.status {
                SheetStatus::Processed(stats) => stats.excluded,
                _ => 0,
            })
            .sum()
    }
}
