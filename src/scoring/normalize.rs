use std::collections::BTreeMap;

use crate::domain::{CollegePolicy, Factor, FactorScores};

/// Midpoint of the 0-10 scale, used when a factor is unknown.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Factor scores after neutral defaulting and policy gating.
///
/// Every factor of the universe is present as a key; `None` marks a factor
/// that was gated out by policy or left unknown without defaulting.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedScores(BTreeMap<Factor, Option<f64>>);

impl NormalizedScores {
    pub fn get(&self, factor: Factor) -> Option<f64> {
        self.0.get(&factor).copied().flatten()
    }

    pub fn is_active(&self, factor: Factor) -> bool {
        self.get(factor).is_some()
    }

    /// Factors with a value, in canonical universe order.
    pub fn active(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        Factor::ALL
            .into_iter()
            .filter_map(|factor| self.get(factor).map(|score| (factor, score)))
    }
}

/// Fill missing factor scores with the neutral midpoint and apply policy
/// gates.
///
/// Gates override any supplied value: a test-blind college excludes
/// `testing` entirely (not merely defaulted), and a need-blind college
/// excludes `ability_to_pay`. Out-of-range values pass through untouched;
/// clamping is the scorer's job.
pub fn normalize(
    scores: &FactorScores,
    policy: CollegePolicy,
    treat_missing_as_neutral: bool,
) -> NormalizedScores {
    let mut output = BTreeMap::new();

    for factor in Factor::ALL {
        let mut value = scores.get(factor);

        if value.is_none() && treat_missing_as_neutral {
            value = Some(NEUTRAL_SCORE);
        }

        if factor == Factor::Testing && !policy.uses_testing {
            value = None;
        }
        if factor == Factor::AbilityToPay && !policy.need_aware {
            value = None;
        }

        output.insert(factor, value);
    }

    NormalizedScores(output)
}
