//! Rubric constants: factor weights and the dampened achievement cluster.
//!
//! Weights are percent-like units. The composite normalizes by the sum of
//! weights actually in play, so the table does not need to total exactly 100.

use crate::domain::Factor;

/// Weight of a factor in the admission rubric.
pub const fn weight_of(factor: Factor) -> f64 {
    match factor {
        Factor::Grades => 25.0,
        Factor::Rigor => 12.0,
        Factor::Testing => 8.0,
        Factor::Essay => 8.0,
        Factor::Recommendations => 4.0,
        Factor::Interview => 1.0,
        Factor::EcsLeadership => 7.5,
        Factor::PlanTiming => 4.0,
        Factor::MajorFit => 3.0,
        Factor::DemonstratedInterest => 1.5,
        Factor::AthleticRecruit => 4.0,
        Factor::PortfolioAudition => 2.0,
        Factor::GeographyResidency => 3.0,
        Factor::FirstgenDiversity => 3.0,
        Factor::AbilityToPay => 3.0,
        Factor::AwardsPublications => 2.0,
        Factor::PolicyKnob => 2.0,
        Factor::Legacy => 1.5,
        Factor::ConductRecord => 0.5,
        Factor::HsReputation => 2.0,
    }
}

/// Achievement/leadership-correlated factors subject to cluster dampening.
pub const CLUSTER_FACTORS: [Factor; 4] = [
    Factor::EcsLeadership,
    Factor::AwardsPublications,
    Factor::AthleticRecruit,
    Factor::PortfolioAudition,
];

pub fn is_cluster_factor(factor: Factor) -> bool {
    CLUSTER_FACTORS.contains(&factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_factor_carries_a_positive_weight() {
        for factor in Factor::ALL {
            assert!(weight_of(factor) > 0.0, "{} has no weight", factor.label());
        }
    }

    #[test]
    fn cluster_factors_are_members_of_the_universe() {
        for factor in CLUSTER_FACTORS {
            assert!(Factor::ALL.contains(&factor));
            assert!(is_cluster_factor(factor));
        }
        assert!(!is_cluster_factor(Factor::Grades));
    }
}
