//! Formula-based probability mapping.
//!
//! The trait is the contract the blender depends on; the shipped
//! implementation maps the composite onto a probability with a logit shift
//! anchored at the college's acceptance rate, which keeps the curve monotone
//! in both the composite and the rate by construction.

use serde::{Deserialize, Serialize};

use crate::audit::{build_audit, AuditReport, AuditRow};
use crate::domain::{CollegePolicy, Factor, FactorScores};
use crate::scoring::{apply_conduct_penalty, compute_composite};

/// Lower clip applied to formula probabilities.
pub const FORMULA_PROBABILITY_FLOOR: f64 = 0.01;
/// Upper clip applied to formula probabilities.
pub const FORMULA_PROBABILITY_CEILING: f64 = 0.98;

/// Output contract of the formula mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaReport {
    pub probability: f64,
    pub composite_score: f64,
    pub percentile_estimate: f64,
    pub factor_breakdown: Vec<AuditRow>,
    pub policy_notes: Vec<String>,
}

impl FormulaReport {
    /// Package the report for the API boundary, attaching the acceptance
    /// rate it was computed against.
    pub fn to_audit_report(&self, acceptance_rate: f64) -> AuditReport {
        AuditReport {
            composite_score: self.composite_score,
            probability: self.probability,
            acceptance_rate,
            percentile_estimate: self.percentile_estimate,
            factor_breakdown: self.factor_breakdown.clone(),
            policy_notes: self.policy_notes.clone(),
        }
    }
}

/// Maps factor scores and college selectivity to a probability.
///
/// Implementations must be monotone: a higher composite never lowers the
/// probability, and a higher acceptance rate never lowers it for a fixed
/// composite.
pub trait FormulaMapper: Send + Sync {
    fn map(
        &self,
        scores: &FactorScores,
        acceptance_rate: f64,
        policy: CollegePolicy,
    ) -> FormulaReport;
}

/// Default formula: a logistic curve anchored at the acceptance rate.
///
/// An all-neutral profile (composite 500) maps to the acceptance rate
/// itself; each 100 composite points shift the log-odds by `slope`.
#[derive(Debug, Clone)]
pub struct LogisticFormula {
    slope: f64,
}

impl LogisticFormula {
    pub const DEFAULT_SLOPE: f64 = 0.9;

    pub fn new(slope: f64) -> Self {
        let slope = if slope.is_finite() && slope > 0.0 {
            slope
        } else {
            Self::DEFAULT_SLOPE
        };
        Self { slope }
    }
}

impl Default for LogisticFormula {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SLOPE)
    }
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl FormulaMapper for LogisticFormula {
    fn map(
        &self,
        scores: &FactorScores,
        acceptance_rate: f64,
        policy: CollegePolicy,
    ) -> FormulaReport {
        let result = compute_composite(scores, policy);

        let conduct = scores.get(Factor::ConductRecord).map(|s| s.clamp(0.0, 10.0));
        let composite = apply_conduct_penalty(result.composite, conduct);

        let anchor = acceptance_rate.clamp(0.02, 0.98);
        let shift = self.slope * (composite - 500.0) / 100.0;
        let probability = sigmoid(logit(anchor) + shift)
            .clamp(FORMULA_PROBABILITY_FLOOR, FORMULA_PROBABILITY_CEILING);

        let percentile_estimate = 100.0 * sigmoid((composite - 500.0) / 120.0);

        let mut policy_notes = Vec::new();
        if !policy.uses_testing {
            policy_notes.push("Test-blind policy: standardized testing not used".to_string());
        }
        if !policy.need_aware {
            policy_notes.push("Need-blind admissions: ability to pay not considered".to_string());
        }
        if let Some(note) = &result.cluster_note {
            policy_notes.push(note.clone());
        }

        FormulaReport {
            probability,
            composite_score: composite,
            percentile_estimate,
            factor_breakdown: build_audit(scores, &result.used_factors),
            policy_notes,
        }
    }
}

/// Convenience wrapper running the default formula and packaging the result
/// as an audit report.
pub fn admission_report(
    scores: &FactorScores,
    acceptance_rate: f64,
    policy: CollegePolicy,
) -> AuditReport {
    LogisticFormula::default()
        .map(scores, acceptance_rate, policy)
        .to_audit_report(acceptance_rate)
}
