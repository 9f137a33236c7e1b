//! Elite-institution calibration.
//!
//! Ultra-selective schools reject most strong applicants, so raw blended
//! probabilities run optimistic there. A read-only table of per-institution
//! shrinkage entries, loaded once at startup, multiplies the probability
//! down and caps it, with the intensity modulated by the applicant's
//! assessed profile strength. Entries live in an explicit ordered list so
//! match priority is deterministic rather than an accident of map iteration.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::StudentProfile;

/// Selectivity band of a calibrated institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectivityCategory {
    UltraSelective,
    HighlySelective,
    VerySelective,
    Selective,
}

impl SelectivityCategory {
    pub const fn label(self) -> &'static str {
        match self {
            SelectivityCategory::UltraSelective => "ultra_selective",
            SelectivityCategory::HighlySelective => "highly_selective",
            SelectivityCategory::VerySelective => "very_selective",
            SelectivityCategory::Selective => "selective",
        }
    }
}

/// Per-institution shrinkage entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub calibration_factor: f64,
    pub max_probability: f64,
    pub acceptance_rate: f64,
    pub category: SelectivityCategory,
}

/// Coarse applicant classification used to modulate calibration intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStrength {
    Perfect,
    Strong,
    Average,
    BelowAverage,
}

impl ProfileStrength {
    /// Assess a profile by accumulating points across academic metrics and
    /// the density of high factor scores.
    pub fn assess(student: &StudentProfile) -> Self {
        let mut points = 0u8;

        match student.gpa_unweighted {
            Some(gpa) if gpa >= 3.95 => points += 2,
            Some(gpa) if gpa >= 3.8 => points += 1,
            _ => {}
        }
        match student.gpa_weighted {
            Some(gpa) if gpa >= 4.3 => points += 2,
            Some(gpa) if gpa >= 4.0 => points += 1,
            _ => {}
        }
        match student.sat_total {
            Some(sat) if sat >= 1550 => points += 2,
            Some(sat) if sat >= 1500 => points += 1,
            _ => {}
        }
        match student.act_composite {
            Some(act) if act >= 35 => points += 2,
            Some(act) if act >= 34 => points += 1,
            _ => {}
        }

        let high_factors = student
            .factor_scores
            .iter()
            .filter(|(_, score)| *score >= 8.0)
            .count();
        if high_factors >= 15 {
            points += 2;
        } else if high_factors >= 10 {
            points += 1;
        }

        match points {
            6.. => ProfileStrength::Perfect,
            4..=5 => ProfileStrength::Strong,
            2..=3 => ProfileStrength::Average,
            _ => ProfileStrength::BelowAverage,
        }
    }

    fn factor_multiplier(self) -> f64 {
        match self {
            ProfileStrength::Perfect => 1.2,
            ProfileStrength::Strong => 1.0,
            ProfileStrength::Average => 0.7,
            ProfileStrength::BelowAverage => 0.5,
        }
    }

    fn cap_multiplier(self) -> f64 {
        match self {
            ProfileStrength::Perfect => 1.0,
            ProfileStrength::Strong => 0.8,
            ProfileStrength::Average => 0.6,
            ProfileStrength::BelowAverage => 0.4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProfileStrength::Perfect => "perfect",
            ProfileStrength::Strong => "strong",
            ProfileStrength::Average => "average",
            ProfileStrength::BelowAverage => "below_average",
        }
    }
}

/// Errors raised while loading a calibration table.
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("unable to read calibration table")]
    Io(#[from] std::io::Error),
    #[error("malformed calibration table")]
    Csv(#[from] csv::Error),
    #[error("calibration entry for '{key}' out of range: {detail}")]
    InvalidEntry { key: String, detail: String },
}

#[derive(Debug, Deserialize)]
struct CalibrationRow {
    name: String,
    calibration_factor: f64,
    max_probability: f64,
    acceptance_rate: f64,
    category: SelectivityCategory,
}

/// Ordered lookup of per-institution calibration entries.
///
/// Matching is case-insensitive substring in either direction; the first
/// entry in declaration order wins, so priority is explicit and testable.
#[derive(Debug, Clone)]
pub struct EliteCalibrationTable {
    entries: Vec<(String, CalibrationEntry)>,
}

impl EliteCalibrationTable {
    /// Built-in table covering the institutions where uncalibrated output
    /// is known to run optimistic, ordered most selective first.
    pub fn builtin() -> Self {
        let rows: [(&str, f64, f64, f64, SelectivityCategory); 19] = [
            (
                "massachusetts institute of technology",
                0.07344,
                0.09795,
                0.041,
                SelectivityCategory::UltraSelective,
            ),
            (
                "harvard university",
                0.0736,
                0.098,
                0.04,
                SelectivityCategory::UltraSelective,
            ),
            (
                "stanford university",
                0.0736,
                0.098,
                0.04,
                SelectivityCategory::UltraSelective,
            ),
            (
                "yale university",
                0.10728,
                0.146025,
                0.053,
                SelectivityCategory::HighlySelective,
            ),
            (
                "princeton university",
                0.10944,
                0.1467,
                0.044,
                SelectivityCategory::HighlySelective,
            ),
            (
                "columbia university",
                0.11016,
                0.146925,
                0.041,
                SelectivityCategory::HighlySelective,
            ),
            (
                "university of pennsylvania",
                0.10584,
                0.145575,
                0.059,
                SelectivityCategory::HighlySelective,
            ),
            (
                "dartmouth college",
                0.10512,
                0.14535,
                0.062,
                SelectivityCategory::HighlySelective,
            ),
            (
                "brown university",
                0.1068,
                0.145875,
                0.055,
                SelectivityCategory::HighlySelective,
            ),
            (
                "university of chicago",
                0.1044,
                0.145125,
                0.065,
                SelectivityCategory::HighlySelective,
            ),
            (
                "cornell university",
                0.1652,
                0.21043,
                0.087,
                SelectivityCategory::VerySelective,
            ),
            (
                "duke university",
                0.1764,
                0.21351,
                0.059,
                SelectivityCategory::VerySelective,
            ),
            (
                "northwestern university",
                0.172,
                0.2123,
                0.07,
                SelectivityCategory::VerySelective,
            ),
            (
                "vanderbilt university",
                0.1716,
                0.21219,
                0.071,
                SelectivityCategory::VerySelective,
            ),
            (
                "rice university",
                0.2835,
                0.28575,
                0.095,
                SelectivityCategory::Selective,
            ),
            (
                "emory university",
                0.2583,
                0.28035,
                0.131,
                SelectivityCategory::Selective,
            ),
            (
                "georgetown university",
                0.266,
                0.282,
                0.12,
                SelectivityCategory::Selective,
            ),
            (
                "carnegie mellon university",
                0.2555,
                0.27975,
                0.135,
                SelectivityCategory::Selective,
            ),
            (
                "new york university",
                0.259,
                0.2805,
                0.13,
                SelectivityCategory::Selective,
            ),
        ];

        let entries = rows
            .into_iter()
            .map(|(name, factor, max_prob, rate, category)| {
                (
                    name.to_string(),
                    CalibrationEntry {
                        calibration_factor: factor,
                        max_probability: max_prob,
                        acceptance_rate: rate,
                        category,
                    },
                )
            })
            .collect();

        Self { entries }
    }

    /// Load a table from CSV with columns
    /// `name,calibration_factor,max_probability,acceptance_rate,category`.
    /// Row order defines match priority.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CalibrationError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for record in csv_reader.deserialize::<CalibrationRow>() {
            let row = record?;
            validate_row(&row)?;
            entries.push((
                row.name.to_lowercase(),
                CalibrationEntry {
                    calibration_factor: row.calibration_factor,
                    max_probability: row.max_probability,
                    acceptance_rate: row.acceptance_rate,
                    category: row.category,
                },
            ));
        }

        Ok(Self { entries })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, CalibrationError> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the calibration entry for a college, if any.
    pub fn lookup(&self, college_name: &str) -> Option<&CalibrationEntry> {
        let needle = college_name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(key, _)| needle.contains(key.as_str()) || key.contains(needle.as_str()))
            .map(|(_, entry)| entry)
    }

    /// Apply calibration to a probability.
    ///
    /// No table entry for the college means no adjustment. Otherwise the
    /// probability is multiplied by the entry's factor scaled for the
    /// profile-strength bucket, then capped.
    pub fn apply(
        &self,
        probability: f64,
        college_name: &str,
        strength: ProfileStrength,
    ) -> f64 {
        let Some(entry) = self.lookup(college_name) else {
            return probability;
        };

        let factor = entry.calibration_factor * strength.factor_multiplier();
        let cap = entry.max_probability * strength.cap_multiplier();
        let calibrated = (probability * factor).min(cap);

        debug!(
            college = college_name,
            strength = strength.label(),
            category = entry.category.label(),
            raw = probability,
            calibrated,
            "elite calibration applied"
        );

        calibrated
    }
}

impl Default for EliteCalibrationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_row(row: &CalibrationRow) -> Result<(), CalibrationError> {
    let bounded = |value: f64| (0.0..=1.0).contains(&value);
    if !(row.calibration_factor.is_finite() && row.calibration_factor > 0.0) {
        return Err(CalibrationError::InvalidEntry {
            key: row.name.clone(),
            detail: format!("calibration_factor {} must be positive", row.calibration_factor),
        });
    }
    if !bounded(row.max_probability) {
        return Err(CalibrationError::InvalidEntry {
            key: row.name.clone(),
            detail: format!("max_probability {} outside [0, 1]", row.max_probability),
        });
    }
    if !bounded(row.acceptance_rate) {
        return Err(CalibrationError::InvalidEntry {
            key: row.name.clone(),
            detail: format!("acceptance_rate {} outside [0, 1]", row.acceptance_rate),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Factor, FactorScores};

    fn perfect_student() -> StudentProfile {
        StudentProfile {
            gpa_unweighted: Some(4.0),
            gpa_weighted: Some(4.5),
            sat_total: Some(1600),
            act_composite: None,
            factor_scores: Factor::ALL.into_iter().map(|f| (f, 9.0)).collect(),
            misc_activities: Vec::new(),
        }
    }

    #[test]
    fn lookup_matches_substrings_in_either_direction() {
        let table = EliteCalibrationTable::builtin();
        assert!(table.lookup("Harvard University").is_some());
        assert!(table
            .lookup("Harvard University - Cambridge Campus")
            .is_some());
        assert!(table.lookup("harvard").is_some());
        assert!(table.lookup("State Community College").is_none());
    }

    #[test]
    fn lookup_priority_follows_declaration_order() {
        let csv = "name,calibration_factor,max_probability,acceptance_rate,category\n\
                   university of example,0.2,0.3,0.1,selective\n\
                   example,0.5,0.9,0.5,selective\n";
        let table = EliteCalibrationTable::from_csv_reader(csv.as_bytes()).expect("parses");

        let entry = table.lookup("University of Example").expect("match");
        assert!((entry.calibration_factor - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn csv_round_trips_the_builtin_shape() {
        let csv = "name,calibration_factor,max_probability,acceptance_rate,category\n\
                   massachusetts institute of technology,0.07344,0.09795,0.041,ultra_selective\n";
        let table = EliteCalibrationTable::from_csv_reader(csv.as_bytes()).expect("parses");
        assert_eq!(table.len(), 1);

        let entry = table.lookup("MIT massachusetts institute of technology").unwrap();
        assert_eq!(entry.category, SelectivityCategory::UltraSelective);
    }

    #[test]
    fn malformed_csv_is_an_error_not_a_panic() {
        let csv = "name,calibration_factor\nharvard,not-a-number\n";
        assert!(EliteCalibrationTable::from_csv_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn out_of_range_rows_are_rejected() {
        let csv = "name,calibration_factor,max_probability,acceptance_rate,category\n\
                   example,0.2,1.5,0.1,selective\n";
        let err = EliteCalibrationTable::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidEntry { .. }));
    }

    #[test]
    fn unmatched_college_passes_probability_through() {
        let table = EliteCalibrationTable::builtin();
        let p = table.apply(0.42, "Open Enrollment University", ProfileStrength::Strong);
        assert!((p - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn calibrated_probability_never_exceeds_the_entry_cap() {
        let table = EliteCalibrationTable::builtin();
        let entry = table.lookup("massachusetts institute of technology").unwrap();
        let cap = entry.max_probability;

        let p = table.apply(
            0.95,
            "Massachusetts Institute of Technology",
            ProfileStrength::Perfect,
        );
        assert!(p <= cap, "calibrated {p} exceeds cap {cap}");
    }

    #[test]
    fn weaker_buckets_shrink_harder() {
        let table = EliteCalibrationTable::builtin();
        let name = "Harvard University";
        let perfect = table.apply(0.5, name, ProfileStrength::Perfect);
        let strong = table.apply(0.5, name, ProfileStrength::Strong);
        let average = table.apply(0.5, name, ProfileStrength::Average);
        let below = table.apply(0.5, name, ProfileStrength::BelowAverage);
        assert!(perfect >= strong);
        assert!(strong >= average);
        assert!(average >= below);
    }

    #[test]
    fn profile_strength_point_schedule() {
        assert_eq!(
            ProfileStrength::assess(&perfect_student()),
            ProfileStrength::Perfect
        );

        let average = StudentProfile {
            gpa_unweighted: Some(3.85),
            gpa_weighted: None,
            sat_total: Some(1510),
            act_composite: None,
            factor_scores: FactorScores::new(),
            misc_activities: Vec::new(),
        };
        assert_eq!(ProfileStrength::assess(&average), ProfileStrength::Average);

        let below = StudentProfile::default();
        assert_eq!(
            ProfileStrength::assess(&below),
            ProfileStrength::BelowAverage
        );
    }

    #[test]
    fn high_factor_density_counts_toward_strength() {
        let mut student = StudentProfile {
            gpa_unweighted: Some(3.96),
            ..StudentProfile::default()
        };
        student.factor_scores = Factor::ALL.into_iter().map(|f| (f, 8.5)).collect();
        // 2 points from GPA + 2 from 15+ high factors
        assert_eq!(ProfileStrength::assess(&student), ProfileStrength::Strong);
    }
}
