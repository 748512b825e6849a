//! Row projection: one raw data row in, zero or one output record out.

use crate::cell::{fetch_text, first_non_blank, first_non_blank_in};
use crate::cost_center::{CostCenterRule, Verdict};
use crate::date::normalize_date;
use crate::fields::{FieldPositionMap, LogicalField};
use crate::model::{CellValue, OutputRecord};

/// Everything fixed for the rows of one sheet.
#[derive(Debug, Clone, Copy)]
pub struct SheetContext<'a> {
    /// Category label; becomes the product type.
    pub category: &'a str,
    /// File name the sheet came from, consulted by the cost-center rule.
    pub source_name: &'a str,
    pub total_marker: &'a str,
    pub rule: &'a CostCenterRule,
    pub fields: &'a FieldPositionMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Emit(OutputRecord),
    /// Blank first cell or a total/footer row.
    Skipped,
    /// Dropped by the cost-center rule.
    Excluded,
}

impl<'a> SheetContext<'a> {
    fn text(&self, row: &[CellValue], field: LogicalField) -> String {
        fetch_text(row, self.fields.positions(field))
    }

    fn date(&self, row: &[CellValue], field: LogicalField) -> String {
        first_non_blank(row, self.fields.positions(field))
            .map(normalize_date)
            .unwrap_or_default()
    }
}

pub fn project_row(ctx: &SheetContext<'_>, row: &[CellValue]) -> RowOutcome {
    if is_footer_or_blank(row, ctx.total_marker) {
        return RowOutcome::Skipped;
    }

    let booking_date = ctx.date(row, LogicalField::BookingDate);

    let cost_center = match ctx.rule.decide(ctx.source_name, || {
        ctx.text(row, LogicalField::BookingDepartment)
    }) {
        Verdict::Include { cost_center } => cost_center,
        Verdict::Exclude => return RowOutcome::Excluded,
    };

    let traveler_name = first_non_blank_in(row, ctx.fields.sources(LogicalField::TravelerName))
        .map(|v| v.to_string())
        .unwrap_or_default();

    RowOutcome::Emit(OutputRecord {
        product_type: ctx.category.to_string(),
        booking_date,
        cost_center,
        traveler_name,
        itinerary_or_city: ctx.text(row, LogicalField::ItineraryOrCity),
        flight_or_hotel: ctx.text(row, LogicalField::FlightOrHotel),
        travel_or_stay_date: ctx.date(row, LogicalField::TravelOrStayDate),
        receivable: ctx.text(row, LogicalField::Receivable),
        trip_order: ctx.text(row, LogicalField::TripOrder),
        note: ctx.text(row, LogicalField::Note),
    })
}

/// The first raw cell is the serial-number column; blank there or equal to
/// the total marker means "not a data row".
fn is_footer_or_blank(row: &[CellValue], total_marker: &str) -> bool {
    match row.first() {
        None => true,
        Some(first) if first.is_blank() => true,
        Some(first) => first.to_string().trim() == total_marker,
    }
}
