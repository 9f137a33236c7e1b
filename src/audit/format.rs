use super::insights::identify_strengths_and_weaknesses;
use super::AuditReport;

const RULE: &str = "----------------------------------------------------------------------";

/// Render an audit report as human-readable text.
///
/// Presentation only; callers wanting structured output should serialize the
/// report itself.
pub fn render_audit(report: &AuditReport) -> String {
    let mut lines = Vec::new();

    lines.push("ADMISSION PROBABILITY AUDIT".to_string());
    lines.push(RULE.to_string());
    lines.push(format!(
        "  Composite score:     {:.1} / 1000",
        report.composite_score
    ));
    lines.push(format!(
        "  Admission prob:      {:.1}%",
        report.probability * 100.0
    ));
    lines.push(format!(
        "  School accept rate:  {:.1}%",
        report.acceptance_rate * 100.0
    ));
    lines.push(format!(
        "  Percentile estimate: ~{:.0}th",
        report.percentile_estimate
    ));
    lines.push(String::new());

    lines.push(format!(
        "{:<24} {:>7} {:>7} {:>9}  {}",
        "Factor", "Weight", "Score", "Contrib", "Note"
    ));
    lines.push(RULE.to_string());
    for row in &report.factor_breakdown {
        let score = row
            .score
            .map(|s| format!("{s:.1}"))
            .unwrap_or_else(|| "N/A".to_string());
        let contribution = row
            .weighted_contribution
            .map(|c| format!("{c:.1}"))
            .unwrap_or_else(|| "---".to_string());
        lines.push(format!(
            "{:<24} {:>6}% {:>7} {:>9}  {}",
            row.factor.label(),
            row.weight,
            score,
            contribution,
            row.note.as_deref().unwrap_or("")
        ));
    }

    if !report.policy_notes.is_empty() {
        lines.push(String::new());
        lines.push("Policy notes:".to_string());
        for note in &report.policy_notes {
            lines.push(format!("  - {note}"));
        }
    }

    let insights = identify_strengths_and_weaknesses(&report.factor_breakdown, 3);
    if !insights.strengths.is_empty() {
        lines.push(String::new());
        lines.push("Top strengths:".to_string());
        for strength in &insights.strengths {
            lines.push(format!("  + {strength}"));
        }
    }
    if !insights.weaknesses.is_empty() {
        lines.push(String::new());
        lines.push("Areas for improvement:".to_string());
        for weakness in &insights.weaknesses {
            lines.push(format!("  ! {weakness}"));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::super::build_audit;
    use super::*;
    use crate::domain::{CollegePolicy, Factor, FactorScores};
    use crate::scoring::compute_composite;

    #[test]
    fn rendering_includes_summary_and_every_factor() {
        let mut scores = FactorScores::new();
        scores.set(Factor::Grades, 9.2);
        scores.set(Factor::Interview, 2.0);
        let result = compute_composite(&scores, CollegePolicy::default());

        let report = AuditReport {
            composite_score: result.composite,
            probability: 0.18,
            acceptance_rate: 0.10,
            percentile_estimate: 68.0,
            factor_breakdown: build_audit(&scores, &result.used_factors),
            policy_notes: vec!["Need-blind admissions: ability to pay not considered".to_string()],
        };

        let text = render_audit(&report);

        assert!(text.contains("ADMISSION PROBABILITY AUDIT"));
        assert!(text.contains("grades"));
        assert!(text.contains("ability_to_pay"));
        assert!(text.contains("policy-gated (not used)"));
        assert!(text.contains("Top strengths:"));
        assert!(text.contains("Areas for improvement:"));
        assert!(text.contains("Need-blind admissions"));
    }
}
