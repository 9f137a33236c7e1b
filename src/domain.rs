use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Factors permitted in the admission rubric.
///
/// The universe is fixed: every scoring, gating, and audit operation walks
/// [`Factor::ALL`] so that output ordering never depends on input ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Grades,
    Rigor,
    Testing,
    Essay,
    Recommendations,
    Interview,
    EcsLeadership,
    PlanTiming,
    MajorFit,
    DemonstratedInterest,
    AthleticRecruit,
    PortfolioAudition,
    GeographyResidency,
    FirstgenDiversity,
    AbilityToPay,
    AwardsPublications,
    PolicyKnob,
    Legacy,
    ConductRecord,
    HsReputation,
}

impl Factor {
    /// Canonical ordering of the factor universe.
    pub const ALL: [Factor; 20] = [
        Factor::Grades,
        Factor::Rigor,
        Factor::Testing,
        Factor::Essay,
        Factor::Recommendations,
        Factor::Interview,
        Factor::EcsLeadership,
        Factor::PlanTiming,
        Factor::MajorFit,
        Factor::DemonstratedInterest,
        Factor::AthleticRecruit,
        Factor::PortfolioAudition,
        Factor::GeographyResidency,
        Factor::FirstgenDiversity,
        Factor::AbilityToPay,
        Factor::AwardsPublications,
        Factor::PolicyKnob,
        Factor::Legacy,
        Factor::ConductRecord,
        Factor::HsReputation,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Factor::Grades => "grades",
            Factor::Rigor => "rigor",
            Factor::Testing => "testing",
            Factor::Essay => "essay",
            Factor::Recommendations => "recommendations",
            Factor::Interview => "interview",
            Factor::EcsLeadership => "ecs_leadership",
            Factor::PlanTiming => "plan_timing",
            Factor::MajorFit => "major_fit",
            Factor::DemonstratedInterest => "demonstrated_interest",
            Factor::AthleticRecruit => "athletic_recruit",
            Factor::PortfolioAudition => "portfolio_audition",
            Factor::GeographyResidency => "geography_residency",
            Factor::FirstgenDiversity => "firstgen_diversity",
            Factor::AbilityToPay => "ability_to_pay",
            Factor::AwardsPublications => "awards_publications",
            Factor::PolicyKnob => "policy_knob",
            Factor::Legacy => "legacy",
            Factor::ConductRecord => "conduct_record",
            Factor::HsReputation => "hs_reputation",
        }
    }
}

/// Single boundary type for optional numeric transport values.
///
/// Upstream collaborators ship factor scores as loosely typed strings; all of
/// that parsing funnels through here so missing and malformed values are
/// represented the same way everywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawScore(Option<f64>);

impl RawScore {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self(None);
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Self(Some(number)),
            _ => Self(None),
        }
    }

    pub fn value(self) -> Option<f64> {
        self.0
    }
}

impl From<f64> for RawScore {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self(Some(value))
        } else {
            Self(None)
        }
    }
}

/// Raw factor scores supplied by the intake collaborator on the 0-10 scale.
///
/// An absent key means the factor is unknown. Unknown is never coerced to
/// zero; the normalizer decides between neutral defaulting and exclusion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorScores(BTreeMap<Factor, f64>);

impl FactorScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, factor: Factor, score: f64) {
        self.0.insert(factor, score);
    }

    /// Insert a transport-layer value, dropping it when unparseable.
    pub fn set_raw(&mut self, factor: Factor, raw: &str) {
        if let Some(score) = RawScore::parse(raw).value() {
            self.0.insert(factor, score);
        }
    }

    pub fn get(&self, factor: Factor) -> Option<f64> {
        self.0.get(&factor).copied()
    }

    pub fn contains(&self, factor: Factor) -> bool {
        self.0.contains_key(&factor)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        self.0.iter().map(|(factor, score)| (*factor, *score))
    }
}

impl FromIterator<(Factor, f64)> for FactorScores {
    fn from_iter<I: IntoIterator<Item = (Factor, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// College-specific policies that affect scoring. Immutable per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollegePolicy {
    pub uses_testing: bool,
    pub need_aware: bool,
}

impl Default for CollegePolicy {
    fn default() -> Self {
        Self {
            uses_testing: true,
            need_aware: false,
        }
    }
}

/// College metadata supplied by the request-handling collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeSnapshot {
    pub name: String,
    pub acceptance_rate: Option<f64>,
    pub test_policy: String,
    pub financial_aid_policy: String,
}

impl CollegeSnapshot {
    pub fn acceptance_rate_or_default(&self) -> f64 {
        self.acceptance_rate.unwrap_or(0.1)
    }

    pub fn policy(&self) -> CollegePolicy {
        CollegePolicy {
            uses_testing: self.test_policy != "Blind",
            need_aware: self.financial_aid_policy == "Need-aware",
        }
    }
}

/// Applicant snapshot consumed by the prediction pipeline.
///
/// Academic metrics back the profile-strength assessment and the degraded
/// fallback path; the factor scores drive the formula, and the free-text
/// activity bullets feed the optional misc-signal uplift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub gpa_unweighted: Option<f64>,
    pub gpa_weighted: Option<f64>,
    pub sat_total: Option<u32>,
    pub act_composite: Option<u32>,
    pub factor_scores: FactorScores,
    #[serde(default)]
    pub misc_activities: Vec<String>,
}

/// Coarse banding of a final probability for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanceBand {
    Reach,
    Target,
    Safety,
}

impl ChanceBand {
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.40 {
            ChanceBand::Reach
        } else if probability < 0.65 {
            ChanceBand::Target
        } else {
            ChanceBand::Safety
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ChanceBand::Reach => "reach",
            ChanceBand::Target => "target",
            ChanceBand::Safety => "safety",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_score_parses_numeric_transport_values() {
        assert_eq!(RawScore::parse("7.5").value(), Some(7.5));
        assert_eq!(RawScore::parse(" 3 ").value(), Some(3.0));
    }

    #[test]
    fn raw_score_treats_garbage_as_missing() {
        assert_eq!(RawScore::parse("").value(), None);
        assert_eq!(RawScore::parse("   ").value(), None);
        assert_eq!(RawScore::parse("N/A").value(), None);
        assert_eq!(RawScore::parse("NaN").value(), None);
    }

    #[test]
    fn set_raw_skips_unparseable_values() {
        let mut scores = FactorScores::new();
        scores.set_raw(Factor::Grades, "9.2");
        scores.set_raw(Factor::Essay, "unknown");
        assert_eq!(scores.get(Factor::Grades), Some(9.2));
        assert!(!scores.contains(Factor::Essay));
    }

    #[test]
    fn snapshot_policy_derivation_matches_policy_strings() {
        let college = CollegeSnapshot {
            name: "Example College".to_string(),
            acceptance_rate: None,
            test_policy: "Blind".to_string(),
            financial_aid_policy: "Need-aware".to_string(),
        };
        let policy = college.policy();
        assert!(!policy.uses_testing);
        assert!(policy.need_aware);
        assert!((college.acceptance_rate_or_default() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn band_thresholds() {
        assert_eq!(ChanceBand::from_probability(0.05), ChanceBand::Reach);
        assert_eq!(ChanceBand::from_probability(0.39), ChanceBand::Reach);
        assert_eq!(ChanceBand::from_probability(0.40), ChanceBand::Target);
        assert_eq!(ChanceBand::from_probability(0.64), ChanceBand::Target);
        assert_eq!(ChanceBand::from_probability(0.65), ChanceBand::Safety);
    }
}
