//! Audit trail for probability calculations: a per-factor breakdown showing
//! exactly what contributed to the composite, plus derived insights and a
//! plain-text rendering.

mod format;
mod insights;

pub use format::render_audit;
pub use insights::{identify_strengths_and_weaknesses, Insights};

use serde::{Deserialize, Serialize, Serializer};

use crate::domain::{Factor, FactorScores};
use crate::scoring::NEUTRAL_SCORE;
use crate::weights::weight_of;

/// Single factor's contribution to the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRow {
    pub factor: Factor,
    pub weight: f64,
    /// Clamped 0-10 score, `None` when the factor was policy-gated.
    pub score: Option<f64>,
    pub weighted_contribution: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

/// Complete audit report for one probability calculation.
///
/// Serialization applies the documented API rounding: composite and
/// percentile to 1 decimal, probabilities to 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    #[serde(serialize_with = "round1")]
    pub composite_score: f64,
    #[serde(serialize_with = "round3")]
    pub probability: f64,
    #[serde(serialize_with = "round3")]
    pub acceptance_rate: f64,
    #[serde(serialize_with = "round1")]
    pub percentile_estimate: f64,
    pub factor_breakdown: Vec<AuditRow>,
    pub policy_notes: Vec<String>,
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn round1<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 1))
}

fn round3<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 3))
}

/// Build the audit trail, one row per factor in the full universe.
///
/// Contributions here use the original, undampened weights even when the
/// scorer dampened the cluster for the composite itself. That asymmetry is
/// intentional display behavior: the audit answers "what does each factor
/// weigh in the rubric", not "what did the dampened aggregate use".
pub fn build_audit(scores: &FactorScores, used_factors: &[Factor]) -> Vec<AuditRow> {
    let mut rows = Vec::with_capacity(Factor::ALL.len());

    for factor in Factor::ALL {
        let weight = weight_of(factor);

        if !used_factors.contains(&factor) {
            rows.push(AuditRow {
                factor,
                weight,
                score: None,
                weighted_contribution: None,
                note: Some("policy-gated (not used)".to_string()),
            });
            continue;
        }

        let supplied = scores.contains(factor);
        let score = scores
            .get(factor)
            .unwrap_or(NEUTRAL_SCORE)
            .clamp(0.0, 10.0);
        let contribution = score * weight;

        let note = if score == NEUTRAL_SCORE && !supplied {
            Some("neutral default (no data)".to_string())
        } else if score >= 9.0 {
            Some("exceptional strength".to_string())
        } else if score <= 3.0 {
            Some("area of concern".to_string())
        } else {
            None
        };

        rows.push(AuditRow {
            factor,
            weight,
            score: Some(round_to(score, 1)),
            weighted_contribution: Some(round_to(contribution, 2)),
            note,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CollegePolicy;
    use crate::scoring::compute_composite;

    fn used_with_default_policy(scores: &FactorScores) -> Vec<Factor> {
        compute_composite(scores, CollegePolicy::default()).used_factors
    }

    #[test]
    fn audit_covers_the_full_universe() {
        let scores = FactorScores::new();
        let used = used_with_default_policy(&scores);
        let rows = build_audit(&scores, &used);
        assert_eq!(rows.len(), Factor::ALL.len());
    }

    #[test]
    fn gated_factor_rows_carry_no_score() {
        let mut scores = FactorScores::new();
        scores.set(Factor::AbilityToPay, 8.0);
        let used = used_with_default_policy(&scores);

        let rows = build_audit(&scores, &used);
        let row = rows
            .iter()
            .find(|row| row.factor == Factor::AbilityToPay)
            .expect("row present");

        assert_eq!(row.score, None);
        assert_eq!(row.weighted_contribution, None);
        assert_eq!(row.note.as_deref(), Some("policy-gated (not used)"));
    }

    #[test]
    fn neutral_default_is_annotated_only_when_data_was_absent() {
        let mut scores = FactorScores::new();
        scores.set(Factor::Grades, 5.0);
        let used = used_with_default_policy(&scores);
        let rows = build_audit(&scores, &used);

        let grades = rows.iter().find(|r| r.factor == Factor::Grades).unwrap();
        assert_eq!(grades.note, None, "supplied 5.0 is not a default");

        let essay = rows.iter().find(|r| r.factor == Factor::Essay).unwrap();
        assert_eq!(essay.note.as_deref(), Some("neutral default (no data)"));
    }

    #[test]
    fn strength_and_concern_annotations() {
        let mut scores = FactorScores::new();
        scores.set(Factor::Grades, 9.4);
        scores.set(Factor::Interview, 2.0);
        let used = used_with_default_policy(&scores);
        let rows = build_audit(&scores, &used);

        let grades = rows.iter().find(|r| r.factor == Factor::Grades).unwrap();
        assert_eq!(grades.note.as_deref(), Some("exceptional strength"));

        let interview = rows.iter().find(|r| r.factor == Factor::Interview).unwrap();
        assert_eq!(interview.note.as_deref(), Some("area of concern"));
    }

    #[test]
    fn contributions_use_undampened_weights() {
        let mut scores = FactorScores::new();
        scores.set(Factor::EcsLeadership, 9.0);
        scores.set(Factor::AwardsPublications, 9.0);
        let result = compute_composite(&scores, CollegePolicy::default());
        assert!(result.cluster_note.is_some(), "dampening should fire");

        let rows = build_audit(&scores, &result.used_factors);
        let ecs = rows
            .iter()
            .find(|r| r.factor == Factor::EcsLeadership)
            .unwrap();
        assert!((ecs.weight - weight_of(Factor::EcsLeadership)).abs() < f64::EPSILON);
        assert_eq!(
            ecs.weighted_contribution,
            Some(9.0 * weight_of(Factor::EcsLeadership))
        );
    }

    #[test]
    fn out_of_range_scores_are_clamped_in_rows() {
        let mut scores = FactorScores::new();
        scores.set(Factor::Grades, 42.0);
        let used = used_with_default_policy(&scores);
        let rows = build_audit(&scores, &used);
        let grades = rows.iter().find(|r| r.factor == Factor::Grades).unwrap();
        assert_eq!(grades.score, Some(10.0));
    }

    #[test]
    fn report_serialization_applies_documented_rounding() {
        let report = AuditReport {
            composite_score: 742.5678,
            probability: 0.123456,
            acceptance_rate: 0.0987654,
            percentile_estimate: 68.444,
            factor_breakdown: Vec::new(),
            policy_notes: vec!["Test-blind policy: standardized testing not used".to_string()],
        };

        let value = serde_json::to_value(&report).expect("serializes");
        assert_eq!(value["composite_score"], 742.6);
        assert_eq!(value["probability"], 0.123);
        assert_eq!(value["acceptance_rate"], 0.099);
        assert_eq!(value["percentile_estimate"], 68.4);
    }
}
