use std::collections::BTreeMap;

use super::normalize::normalize;
use super::ScoringResult;
use crate::domain::{CollegePolicy, Factor, FactorScores};
use crate::weights::{weight_of, CLUSTER_FACTORS};

const CLUSTER_DAMPENING: f64 = 0.85;
const CLUSTER_TRIGGER_SCORE: f64 = 8.0;

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 10.0)
}

/// Reduce cluster-factor weights when two or more of them score high.
///
/// Correlated achievement signals would otherwise be double-counted; the
/// reduction applies to every cluster factor present, not just the high
/// scorers.
fn apply_cluster_dampening(
    active: &BTreeMap<Factor, f64>,
) -> (BTreeMap<Factor, f64>, Option<String>) {
    let mut weights: BTreeMap<Factor, f64> = active
        .keys()
        .map(|factor| (*factor, weight_of(*factor)))
        .collect();

    let high_scorers: Vec<Factor> = CLUSTER_FACTORS
        .into_iter()
        .filter(|factor| {
            active
                .get(factor)
                .is_some_and(|score| *score >= CLUSTER_TRIGGER_SCORE)
        })
        .collect();

    if high_scorers.len() < 2 {
        return (weights, None);
    }

    for factor in CLUSTER_FACTORS {
        if let Some(weight) = weights.get_mut(&factor) {
            *weight *= CLUSTER_DAMPENING;
        }
    }

    let names: Vec<&str> = high_scorers.iter().map(|factor| factor.label()).collect();
    let note = format!("cluster_dampened_15pct: {}", names.join(","));
    (weights, Some(note))
}

/// Compute the composite score (0-1000) from raw factor scores.
///
/// Missing factors default to the neutral midpoint, policy gates are
/// applied, active scores are clamped to 0-10, and the weighted sum is
/// normalized by the weights of the factors actually in play. The composite
/// is therefore relative to whichever factors survived gating, not an
/// absolute fraction of the full rubric.
pub fn compute_composite(raw_scores: &FactorScores, policy: CollegePolicy) -> ScoringResult {
    let normalized = normalize(raw_scores, policy, true);

    let active: BTreeMap<Factor, f64> = normalized
        .active()
        .map(|(factor, score)| (factor, clamp_score(score)))
        .collect();

    let (effective_weights, cluster_note) = apply_cluster_dampening(&active);

    let weighted_sum: f64 = active
        .iter()
        .map(|(factor, score)| score * effective_weights[factor])
        .sum();
    let sum_weights: f64 = effective_weights.values().sum();

    let composite = if sum_weights > 0.0 {
        (weighted_sum / (10.0 * sum_weights)) * 1000.0
    } else {
        0.0
    };

    ScoringResult {
        composite,
        sum_weights,
        used_factors: active.keys().copied().collect(),
        cluster_note,
    }
}

/// Apply the disciplinary penalty to a composite score.
///
/// A conduct score of 5 or better (or no conduct data at all) leaves the
/// composite unchanged; below that the penalty scales linearly up to 40
/// points at a conduct score of zero, floored at zero overall.
pub fn apply_conduct_penalty(composite: f64, conduct_score: Option<f64>) -> f64 {
    let Some(conduct) = conduct_score else {
        return composite;
    };
    if conduct >= 5.0 {
        return composite;
    }

    let penalty = (5.0 - conduct) * 8.0;
    (composite - penalty).max(0.0)
}
