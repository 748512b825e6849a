//! Per-row cost-center assignment and inclusion.
//!
//! Exact string comparisons only. A source whose file name carries the
//! override marker keeps every row under the override label; any other source
//! keeps a row only when its booking department equals the required
//! department literal.

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostCenterRule {
    /// File-name substring that forces the override.
    pub override_marker: String,
    /// Cost center assigned to every row of an override source.
    pub override_label: String,
    /// Booking department a row needs to be kept otherwise.
    pub required_department: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Include { cost_center: String },
    Exclude,
}

impl CostCenterRule {
    /// Decide for one row. `booking_department` is only evaluated when the
    /// source name lacks the override marker.
    pub fn decide<F>(&self, source_name: &str, booking_department: F) -> Verdict
    where
        F: FnOnce() -> String,
    {
        if source_name.contains(self.override_marker.as_str()) {
            return Verdict::Include {
                cost_center: self.override_label.clone(),
            };
        }

        if booking_department() == self.required_department {
            Verdict::Include {
                cost_center: self.required_department.clone(),
            }
        } else {
            Verdict::Exclude
        }
    }

    pub fn validate(&self) -> Result<(), ReconcileError> {
        for (key, value) in [
            ("override_marker", &self.override_marker),
            ("override_label", &self.override_label),
            ("required_department", &self.required_department),
        ] {
            if value.is_empty() {
                return Err(ReconcileError::ConfigValidation(format!(
                    "cost_center.{key} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> CostCenterRule {
        CostCenterRule {
            override_marker: "储发".into(),
            override_label: "储能发展".into(),
            required_department: "战略市场部".into(),
        }
    }

    #[test]
    fn override_marker_forces_label_without_reading_department() {
        let verdict = rule().decide("飞鹤-储发-2024-03.xlsx", || {
            panic!("department must not be read for override sources")
        });
        assert_eq!(
            verdict,
            Verdict::Include {
                cost_center: "储能发展".into()
            }
        );
    }

    #[test]
    fn required_department_is_kept() {
        let verdict = rule().decide("飞鹤-2024-03.xlsx", || "战略市场部".into());
        assert_eq!(
            verdict,
            Verdict::Include {
                cost_center: "战略市场部".into()
            }
        );
    }

    #[test]
    fn other_departments_are_excluded() {
        let verdict = rule().decide("飞鹤-2024-03.xlsx", || "财务部".into());
        assert_eq!(verdict, Verdict::Exclude);
    }

    #[test]
    fn comparison_is_exact() {
        let r = rule();
        assert_eq!(r.decide("a.xlsx", || " 战略市场部".into()), Verdict::Exclude);
        assert_eq!(r.decide("a.xlsx", || "战略市场部 ".into()), Verdict::Exclude);
        assert_eq!(r.decide("a.xlsx", || "战略市场".into()), Verdict::Exclude);
    }

    #[test]
    fn missing_department_is_excluded() {
        assert_eq!(rule().decide("a.xlsx", String::new), Verdict::Exclude);
    }

    #[test]
    fn empty_literal_fails_validation() {
        let mut r = rule();
        r.override_marker.clear();
        let err = r.validate().unwrap_err();
        assert!(err.to_string().contains("override_marker"));
    }
}
