//! Logical fields and header-label resolution.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Logical fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    BookingDate,
    CostCenter,
    PrimaryDepartment,
    BookingDepartment,
    TravelerName,
    ItineraryOrCity,
    FlightOrHotel,
    TravelOrStayDate,
    Receivable,
    TripOrder,
    Note,
}

impl LogicalField {
    pub const ALL: [LogicalField; 11] = [
        Self::BookingDate,
        Self::CostCenter,
        Self::PrimaryDepartment,
        Self::BookingDepartment,
        Self::TravelerName,
        Self::ItineraryOrCity,
        Self::FlightOrHotel,
        Self::TravelOrStayDate,
        Self::Receivable,
        Self::TripOrder,
        Self::Note,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::BookingDate => "booking_date",
            Self::CostCenter => "cost_center",
            Self::PrimaryDepartment => "primary_department",
            Self::BookingDepartment => "booking_department",
            Self::TravelerName => "traveler_name",
            Self::ItineraryOrCity => "itinerary_or_city",
            Self::FlightOrHotel => "flight_or_hotel",
            Self::TravelOrStayDate => "travel_or_stay_date",
            Self::Receivable => "receivable",
            Self::TripOrder => "trip_order",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Candidate table
// ---------------------------------------------------------------------------

/// Acceptable header labels per logical field, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldCandidates {
    pub booking_date: Vec<String>,
    pub cost_center: Vec<String>,
    pub primary_department: Vec<String>,
    pub booking_department: Vec<String>,
    pub traveler_name: Vec<String>,
    pub itinerary_or_city: Vec<String>,
    pub flight_or_hotel: Vec<String>,
    pub travel_or_stay_date: Vec<String>,
    pub receivable: Vec<String>,
    pub trip_order: Vec<String>,
    pub note: Vec<String>,
}

impl FieldCandidates {
    pub fn get(&self, field: LogicalField) -> &[String] {
        match field {
            LogicalField::BookingDate => &self.booking_date,
            LogicalField::CostCenter => &self.cost_center,
            LogicalField::PrimaryDepartment => &self.primary_department,
            LogicalField::BookingDepartment => &self.booking_department,
            LogicalField::TravelerName => &self.traveler_name,
            LogicalField::ItineraryOrCity => &self.itinerary_or_city,
            LogicalField::FlightOrHotel => &self.flight_or_hotel,
            LogicalField::TravelOrStayDate => &self.travel_or_stay_date,
            LogicalField::Receivable => &self.receivable,
            LogicalField::TripOrder => &self.trip_order,
            LogicalField::Note => &self.note,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Column positions per logical field for one sheet.
///
/// `positions` holds every column matched by the field's own candidates.
/// `fallbacks` holds one extra source per fallback label, consulted after the
/// primary positions come up blank.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldPositionMap {
    pub positions: BTreeMap<LogicalField, Vec<usize>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fallbacks: BTreeMap<LogicalField, Vec<Vec<usize>>>,
}

impl FieldPositionMap {
    pub fn positions(&self, field: LogicalField) -> &[usize] {
        self.positions.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Primary positions first, then each fallback source in declared order.
    pub fn sources(&self, field: LogicalField) -> impl Iterator<Item = &[usize]> {
        std::iter::once(self.positions(field)).chain(
            self.fallbacks
                .get(&field)
                .into_iter()
                .flatten()
                .map(Vec::as_slice),
        )
    }

    /// Fields with no column at all, primary or fallback.
    pub fn unresolved(&self) -> Vec<LogicalField> {
        LogicalField::ALL
            .into_iter()
            .filter(|f| self.sources(*f).all(|cols| cols.is_empty()))
            .collect()
    }
}

/// Trim + case-fold.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Every column whose normalized label equals one of `candidates`, grouped
/// by candidate in declared order (not column order).
pub fn columns_for(normalized_header: &[String], candidates: &[String]) -> Vec<usize> {
    let mut found = Vec::new();
    for cand in candidates {
        let cand = normalize_label(cand);
        found.extend(
            normalized_header
                .iter()
                .enumerate()
                .filter(|(_, h)| **h == cand)
                .map(|(i, _)| i),
        );
    }
    found
}

/// Map every logical field to its column positions. Unmatched fields resolve
/// to an empty list; resolution never fails.
pub fn resolve_fields(
    header: &[String],
    candidates: &FieldCandidates,
    fallbacks: &FieldCandidates,
) -> FieldPositionMap {
    let normalized: Vec<String> = header.iter().map(|h| normalize_label(h)).collect();
    let mut map = FieldPositionMap::default();

    for field in LogicalField::ALL {
        map.positions
            .insert(field, columns_for(&normalized, candidates.get(field)));

        let extra = fallbacks.get(field);
        if !extra.is_empty() {
            let sources = extra
                .iter()
                .map(|label| columns_for(&normalized, std::slice::from_ref(label)))
                .collect();
            map.fallbacks.insert(field, sources);
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn ticket_candidates() -> FieldCandidates {
        FieldCandidates {
            booking_date: labels(&["销售日期", "预订日期", "订票日期"]),
            traveler_name: labels(&["中文名", "乘客名", "入住旅客"]),
            flight_or_hotel: labels(&["航班", "酒店名称", "航班号"]),
            note: labels(&["备注", "违反政策"]),
            ..Default::default()
        }
    }

    #[test]
    fn positions_follow_candidate_order() {
        let header = labels(&["序号", "航班号", "乘客名", "航班"]);
        let map = resolve_fields(&header, &ticket_candidates(), &FieldCandidates::default());
        // "航班" is declared before "航班号"
        assert_eq!(map.positions(LogicalField::FlightOrHotel), &[3, 1]);
        assert_eq!(map.positions(LogicalField::TravelerName), &[2]);
    }

    #[test]
    fn matching_is_trimmed_and_case_insensitive() {
        let header = labels(&["  Note ", "REMARK"]);
        let candidates = FieldCandidates {
            note: labels(&["remark", "note"]),
            ..Default::default()
        };
        let map = resolve_fields(&header, &candidates, &FieldCandidates::default());
        assert_eq!(map.positions(LogicalField::Note), &[1, 0]);
    }

    #[test]
    fn repeated_labels_collect_every_column() {
        let header = labels(&["备注", "x", "备注"]);
        let map = resolve_fields(&header, &ticket_candidates(), &FieldCandidates::default());
        assert_eq!(map.positions(LogicalField::Note), &[0, 2]);
    }

    #[test]
    fn unmatched_field_resolves_empty() {
        let header = labels(&["序号"]);
        let map = resolve_fields(&header, &ticket_candidates(), &FieldCandidates::default());
        assert!(map.positions(LogicalField::Receivable).is_empty());
        assert!(map.unresolved().contains(&LogicalField::Receivable));
        assert_eq!(map.unresolved().len(), LogicalField::ALL.len());
    }

    #[test]
    fn fallbacks_become_separate_sources() {
        let header = labels(&["入住旅客", "中文名"]);
        let candidates = FieldCandidates::default();
        let fallbacks = FieldCandidates {
            traveler_name: labels(&["中文名", "乘客名", "入住旅客"]),
            ..Default::default()
        };
        let map = resolve_fields(&header, &candidates, &fallbacks);
        let sources: Vec<&[usize]> = map.sources(LogicalField::TravelerName).collect();
        assert_eq!(sources, vec![&[][..], &[1][..], &[][..], &[0][..]]);
        assert!(!map.unresolved().contains(&LogicalField::TravelerName));
    }

    #[test]
    fn candidates_deserialize_from_toml() {
        let table: FieldCandidates = toml::from_str(
            r#"
booking_date = ["预订日期", "销售日期"]
receivable = ["应收款"]
"#,
        )
        .unwrap();
        assert_eq!(table.get(LogicalField::BookingDate), &["预订日期", "销售日期"]);
        assert!(table.get(LogicalField::Note).is_empty());
    }

    #[test]
    fn unknown_field_key_is_rejected() {
        let res: Result<FieldCandidates, _> = toml::from_str("boking_date = [\"x\"]");
        assert!(res.is_err());
    }
}
