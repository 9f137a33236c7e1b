//! Composite scoring: factor normalization, policy gating, weighted
//! aggregation with cluster dampening, and the conduct penalty.

mod composite;
mod normalize;

pub use composite::{apply_conduct_penalty, compute_composite};
pub use normalize::{normalize, NormalizedScores, NEUTRAL_SCORE};

use serde::{Deserialize, Serialize};

use crate::domain::Factor;

/// Result of a composite score calculation. Produced once per scoring call
/// and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Weighted composite on the 0-1000 scale, relative to the factors that
    /// survived gating.
    pub composite: f64,
    /// Sum of the effective weights of the active factors.
    pub sum_weights: f64,
    /// Factors that contributed to the composite, in canonical order.
    pub used_factors: Vec<Factor>,
    /// Set when cluster dampening fired, naming the triggering factors.
    pub cluster_note: Option<String>,
}
