//! Signals derived from free-text activity bullets.
//!
//! Extraction is keyword-based and deliberately forgiving; every signal is
//! non-negative and feeds a monotone, hard-capped probability uplift so a
//! noisy bullet list can only help an applicant, never hurt one.

use serde::{Deserialize, Serialize};

const COUNT_SOFT_CAP: u32 = 8;

/// Boolean and count signals extracted from activity bullets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiscSignals {
    pub has_internship: bool,
    pub has_research: bool,
    pub has_competition: bool,
    pub has_summer_program: bool,
    pub has_nonprofit: bool,
    pub has_work: bool,
    pub has_leadership: bool,
    pub has_service: bool,
    pub has_award: bool,
    pub award_tier_national: bool,
    pub award_tier_state: bool,
    pub award_tier_regional: bool,
    pub award_tier_school: bool,
    pub has_rigor_ib: bool,
    pub has_rigor_dual_enroll: bool,
    pub has_rigor_cambridge: bool,
    pub has_ap_exam: bool,
    pub count_testing: u32,
    pub count_academics: u32,
    pub count_awards: u32,
    pub count_leadership: u32,
    pub count_service: u32,
    pub count_work: u32,
    pub count_projects: u32,
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

fn infer_award_tier(text: &str) -> Option<&'static str> {
    if contains_any(text, &["national", "intl", "international", "us-wide"]) {
        return Some("national");
    }
    if text.contains("state") {
        return Some("state");
    }
    if contains_any(text, &["regional", "county"]) {
        return Some("regional");
    }
    if contains_any(text, &["district", "school", "chapter"]) {
        return Some("school");
    }
    None
}

fn leading_number(token: &str) -> Option<u32> {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 2 {
        digits.parse().ok()
    } else {
        None
    }
}

/// Find an hour count next to an "hours"/"hrs" unit, if any.
fn extract_hours(text: &str) -> Option<u32> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    for (index, token) in tokens.iter().enumerate() {
        if let Some(unit_at) = token.find("hour").or_else(|| token.find("hrs")) {
            if unit_at > 0 {
                if let Some(hours) = leading_number(&token[..unit_at]) {
                    return Some(hours);
                }
            }
            if index > 0 {
                if let Some(hours) = leading_number(tokens[index - 1]) {
                    return Some(hours);
                }
            }
        }
    }
    None
}

/// Derive uplift signals from activity bullets.
pub fn extract_signals(items: &[String]) -> MiscSignals {
    let mut signals = MiscSignals::default();
    let mut max_hours = 0u32;

    for item in items {
        let text = item.trim().to_lowercase();
        if text.is_empty() {
            continue;
        }

        if contains_any(&text, &["sat", "act", "psat", "testing"]) {
            signals.count_testing += 1;
        }
        if contains_any(
            &text,
            &["ap ", "ib ", "dual enrollment", "dual-enrollment", "cambridge"],
        ) {
            signals.count_academics += 1;
        }
        if contains_any(
            &text,
            &["award", "honor", "finalist", "medalist", "prize", "scholar"],
        ) {
            signals.count_awards += 1;
            signals.has_award = true;
            match infer_award_tier(&text) {
                Some("national") => signals.award_tier_national = true,
                Some("state") => signals.award_tier_state = true,
                Some("regional") => signals.award_tier_regional = true,
                Some("school") => signals.award_tier_school = true,
                _ => {}
            }
        }
        if contains_any(
            &text,
            &["president", "captain", "director", "chair", "leadership", "lead"],
        ) {
            signals.count_leadership += 1;
            signals.has_leadership = true;
        }
        if contains_any(
            &text,
            &["volunteer", "service", "outreach", "tutor", "mentorship"],
        ) {
            signals.count_service += 1;
            signals.has_service = true;
        }
        if contains_any(
            &text,
            &["job", "work", "employment", "barista", "cashier", "staff"],
        ) {
            signals.count_work += 1;
        }
        if contains_any(
            &text,
            &["job", "work", "employment", "barista", "cashier", "staff", "assistant"],
        ) {
            signals.has_work = true;
        }
        if contains_any(
            &text,
            &["project", "startup", "venture", "app", "research", "portfolio"],
        ) {
            signals.count_projects += 1;
        }

        if text.contains("intern") || text.contains("co-op") {
            signals.has_internship = true;
        }
        if text.contains("research") || text.contains("lab") {
            signals.has_research = true;
        }
        if contains_any(
            &text,
            &["competition", "olympiad", "contest", "hackathon", "tournament"],
        ) {
            signals.has_competition = true;
        }
        if contains_any(
            &text,
            &["summer program", "summer institute", "summer fellowship"],
        ) {
            signals.has_summer_program = true;
        }
        if text.contains("nonprofit") || text.contains("foundation") {
            signals.has_nonprofit = true;
        }

        if text.contains("international baccalaureate") || text.contains(" ib ") {
            signals.has_rigor_ib = true;
        }
        if contains_any(&text, &["dual enrollment", "dual-enrollment", "dual credit"]) {
            signals.has_rigor_dual_enroll = true;
        }
        if text.contains("cambridge") {
            signals.has_rigor_cambridge = true;
        }
        if text.contains("ap exam") || text.contains("ap score") {
            signals.has_ap_exam = true;
        }

        if let Some(hours) = extract_hours(&text) {
            max_hours = max_hours.max(hours);
        }
    }

    // Sustained hour commitments imply service/work/leadership intensity
    if max_hours >= 200 {
        signals.has_service = true;
        signals.has_work = true;
        signals.has_leadership = true;
    }

    signals.count_testing = signals.count_testing.min(COUNT_SOFT_CAP);
    signals.count_academics = signals.count_academics.min(COUNT_SOFT_CAP);
    signals.count_awards = signals.count_awards.min(COUNT_SOFT_CAP);
    signals.count_leadership = signals.count_leadership.min(COUNT_SOFT_CAP);
    signals.count_service = signals.count_service.min(COUNT_SOFT_CAP);
    signals.count_work = signals.count_work.min(COUNT_SOFT_CAP);
    signals.count_projects = signals.count_projects.min(COUNT_SOFT_CAP);

    signals
}

/// Convert signals into a bounded probability uplift.
///
/// Monotone-positive: each signal contributes a small fixed increment, award
/// tiers stack modestly, and a density bonus rewards breadth. The sum is
/// scaled down at more selective schools and hard-capped per selectivity
/// band.
pub fn compute_uplift(signals: &MiscSignals, acceptance_rate: f64) -> f64 {
    let rate = acceptance_rate.clamp(0.02, 0.98);

    let selectivity_mult = if rate < 0.10 {
        0.6
    } else if rate < 0.20 {
        0.75
    } else if rate < 0.35 {
        0.9
    } else {
        1.0
    };

    let mut uplift: f64 = 0.0;

    if signals.has_research {
        uplift += 0.015;
    }
    if signals.has_internship {
        uplift += 0.015;
    }
    if signals.has_competition {
        uplift += 0.01;
    }
    if signals.has_summer_program {
        uplift += 0.008;
    }
    if signals.has_nonprofit {
        uplift += 0.008;
    }
    if signals.has_work {
        uplift += 0.006;
    }
    if signals.has_leadership {
        uplift += 0.01;
    }
    if signals.has_service {
        uplift += 0.006;
    }

    if signals.award_tier_national {
        uplift += 0.02;
    }
    if signals.award_tier_state {
        uplift += 0.012;
    }
    if signals.award_tier_regional {
        uplift += 0.01;
    }
    if signals.award_tier_school {
        uplift += 0.006;
    }
    if signals.has_award && uplift < 0.008 {
        uplift += 0.008;
    }

    if signals.has_rigor_ib {
        uplift += 0.01;
    }
    if signals.has_rigor_dual_enroll {
        uplift += 0.01;
    }
    if signals.has_rigor_cambridge {
        uplift += 0.008;
    }
    if signals.has_ap_exam {
        uplift += 0.004;
    }

    let strong_buckets = [
        signals.count_awards,
        signals.count_leadership,
        signals.count_service,
        signals.count_projects,
    ]
    .iter()
    .filter(|count| **count >= 3)
    .count();
    if strong_buckets >= 2 {
        uplift += 0.01;
    }

    uplift *= selectivity_mult;

    let hard_cap = if rate < 0.10 {
        0.06
    } else if rate < 0.25 {
        0.08
    } else {
        0.10
    };

    uplift.min(hard_cap)
}
