use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cost_center::CostCenterRule;
use crate::error::ReconcileError;
use crate::fields::{FieldCandidates, LogicalField};

/// The embedded default profile.
pub const DEFAULT_PROFILE_TOML: &str = include_str!("default_profile.toml");

// ---------------------------------------------------------------------------
// Top-level profile
// ---------------------------------------------------------------------------

/// Every literal the reconciliation depends on: markers, category order,
/// cost-center rule and per-family field candidate tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub name: String,
    pub header_marker: String,
    pub total_marker: String,
    #[serde(default)]
    pub owner_marker: String,
    pub sheet_order: Vec<String>,
    pub cost_center: CostCenterRule,
    #[serde(default)]
    pub fallbacks: FieldCandidates,
    pub families: Vec<SheetFamily>,
}

// ---------------------------------------------------------------------------
// Sheet family
// ---------------------------------------------------------------------------

/// A field candidate table shared by every category whose label contains
/// `sheet_contains`. Families are tried in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetFamily {
    pub name: String,
    pub sheet_contains: String,
    pub fields: FieldCandidates,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Profile {
    pub fn builtin() -> Result<Self, ReconcileError> {
        Self::from_toml(DEFAULT_PROFILE_TOML)
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconcileError> {
        let profile: Profile =
            toml::from_str(input).map_err(|e| ReconcileError::ConfigParse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn to_toml(&self) -> Result<String, ReconcileError> {
        toml::to_string_pretty(self).map_err(|e| ReconcileError::ConfigParse(e.to_string()))
    }

    /// First family whose substring occurs in `category`.
    pub fn family_for(&self, category: &str) -> Option<&SheetFamily> {
        self.families
            .iter()
            .find(|f| category.contains(f.sheet_contains.as_str()))
    }

    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.header_marker.trim().is_empty() {
            return Err(ReconcileError::ConfigValidation(
                "header_marker must not be empty".into(),
            ));
        }

        if self.sheet_order.is_empty() {
            return Err(ReconcileError::ConfigValidation(
                "sheet_order must list at least one category".into(),
            ));
        }

        let mut seen = HashSet::new();
        for category in &self.sheet_order {
            if !seen.insert(category.as_str()) {
                return Err(ReconcileError::ConfigValidation(format!(
                    "duplicate category '{category}' in sheet_order"
                )));
            }
        }

        if self.families.is_empty() {
            return Err(ReconcileError::ConfigValidation(
                "at least one sheet family is required".into(),
            ));
        }

        for family in &self.families {
            check_labels(&format!("family '{}'", family.name), &family.fields)?;
        }
        check_labels("fallbacks", &self.fallbacks)?;

        // Every category must land in some family
        for category in &self.sheet_order {
            if self.family_for(category).is_none() {
                return Err(ReconcileError::NoFamily(category.clone()));
            }
        }

        self.cost_center.validate()
    }
}

fn check_labels(owner: &str, table: &FieldCandidates) -> Result<(), ReconcileError> {
    for field in LogicalField::ALL {
        if table.get(field).iter().any(|label| label.trim().is_empty()) {
            return Err(ReconcileError::ConfigValidation(format!(
                "{owner}: empty label in '{field}'"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "minimal"
header_marker = "No."
total_marker = "Total"
sheet_order = ["Domestic Flight", "Domestic Hotel"]

[cost_center]
override_marker = "storage-dev"
override_label = "storage development"
required_department = "strategic marketing department"

[[families]]
name = "ticket"
sheet_contains = "Flight"
[families.fields]
booking_date = ["Sale Date"]

[[families]]
name = "hotel"
sheet_contains = "Hotel"
[families.fields]
booking_date = ["Booked On"]
"#;

    #[test]
    fn builtin_profile_is_valid() {
        let profile = Profile::builtin().unwrap();
        assert_eq!(profile.header_marker, "序号");
        assert_eq!(profile.total_marker, "合计");
        assert_eq!(
            profile.sheet_order,
            vec!["国际机票", "国内机票", "国际酒店", "国内酒店"]
        );
        assert_eq!(profile.cost_center.override_marker, "储发");
        assert_eq!(profile.families.len(), 2);
    }

    #[test]
    fn builtin_family_selection() {
        let profile = Profile::builtin().unwrap();
        assert_eq!(profile.family_for("国际机票").unwrap().name, "ticket");
        assert_eq!(profile.family_for("国内机票").unwrap().name, "ticket");
        assert_eq!(profile.family_for("国际酒店").unwrap().name, "hotel");
        assert_eq!(profile.family_for("国内酒店").unwrap().name, "hotel");
    }

    #[test]
    fn parse_minimal() {
        let profile = Profile::from_toml(MINIMAL).unwrap();
        assert_eq!(profile.name, "minimal");
        assert!(profile.owner_marker.is_empty());
        assert_eq!(profile.family_for("Domestic Hotel").unwrap().name, "hotel");
        assert!(profile.fallbacks.traveler_name.is_empty());
    }

    #[test]
    fn round_trips_through_toml() {
        let profile = Profile::builtin().unwrap();
        let text = profile.to_toml().unwrap();
        let again = Profile::from_toml(&text).unwrap();
        assert_eq!(profile, again);
    }

    #[test]
    fn reject_category_without_family() {
        let input = MINIMAL.replace(
            r#"sheet_order = ["Domestic Flight", "Domestic Hotel"]"#,
            r#"sheet_order = ["Domestic Flight", "Rail"]"#,
        );
        let err = Profile::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("'Rail'"), "{err}");
    }

    #[test]
    fn reject_duplicate_category() {
        let input = MINIMAL.replace(
            r#"sheet_order = ["Domestic Flight", "Domestic Hotel"]"#,
            r#"sheet_order = ["Domestic Flight", "Domestic Flight"]"#,
        );
        let err = Profile::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("duplicate category"));
    }

    #[test]
    fn reject_empty_marker() {
        let input = MINIMAL.replace(r#"header_marker = "No.""#, r#"header_marker = "  ""#);
        let err = Profile::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("header_marker"));
    }

    #[test]
    fn reject_blank_candidate_label() {
        let input = MINIMAL.replace(r#"booking_date = ["Sale Date"]"#, r#"booking_date = [" "]"#);
        let err = Profile::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("family 'ticket'"), "{err}");
    }

    #[test]
    fn reject_unknown_key() {
        let input = format!("header_row = 3\n{MINIMAL}");
        let err = Profile::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconcileError::ConfigParse(_)));
    }
}
