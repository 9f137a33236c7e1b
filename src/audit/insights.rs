use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::AuditRow;

/// Top strengths and weaknesses distilled from an audit breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Identify the strongest and weakest scored factors.
///
/// Rows without a score (policy-gated) are ignored. Strengths are the top
/// `top_n` factors scoring at least 7; weaknesses come from the bottom
/// `top_n` of the same ranking, capped at a score of 6.
pub fn identify_strengths_and_weaknesses(rows: &[AuditRow], top_n: usize) -> Insights {
    let mut scored: Vec<(&AuditRow, f64)> = rows
        .iter()
        .filter_map(|row| row.score.map(|score| (row, score)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let strengths = scored
        .iter()
        .take(top_n)
        .filter(|(_, score)| *score >= 7.0)
        .map(|(row, score)| format!("{} ({:.1}/10)", row.factor.label(), score))
        .collect();

    let tail_start = scored.len().saturating_sub(top_n);
    let weaknesses = scored[tail_start..]
        .iter()
        .filter(|(_, score)| *score <= 6.0)
        .map(|(row, score)| format!("{} ({:.1}/10)", row.factor.label(), score))
        .collect();

    Insights {
        strengths,
        weaknesses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Factor;
    use crate::weights::weight_of;

    fn row(factor: Factor, score: Option<f64>) -> AuditRow {
        AuditRow {
            factor,
            weight: weight_of(factor),
            score,
            weighted_contribution: score.map(|s| s * weight_of(factor)),
            note: None,
        }
    }

    #[test]
    fn picks_high_scorers_as_strengths() {
        let rows = vec![
            row(Factor::Grades, Some(9.5)),
            row(Factor::Rigor, Some(8.0)),
            row(Factor::Essay, Some(6.5)),
            row(Factor::Interview, Some(3.0)),
        ];

        let insights = identify_strengths_and_weaknesses(&rows, 3);

        assert_eq!(
            insights.strengths,
            vec!["grades (9.5/10)".to_string(), "rigor (8.0/10)".to_string()]
        );
        assert!(insights
            .weaknesses
            .contains(&"interview (3.0/10)".to_string()));
    }

    #[test]
    fn scores_between_seven_and_six_are_neither() {
        let rows = vec![row(Factor::Essay, Some(6.5))];
        let insights = identify_strengths_and_weaknesses(&rows, 3);
        assert!(insights.strengths.is_empty());
        assert!(insights.weaknesses.is_empty());
    }

    #[test]
    fn gated_rows_are_ignored() {
        let rows = vec![row(Factor::Testing, None), row(Factor::Grades, Some(2.0))];
        let insights = identify_strengths_and_weaknesses(&rows, 3);
        assert_eq!(insights.weaknesses, vec!["grades (2.0/10)".to_string()]);
    }

    #[test]
    fn respects_top_n() {
        let rows = vec![
            row(Factor::Grades, Some(9.9)),
            row(Factor::Rigor, Some(9.5)),
            row(Factor::Essay, Some(9.1)),
            row(Factor::Interview, Some(9.0)),
        ];
        let insights = identify_strengths_and_weaknesses(&rows, 2);
        assert_eq!(insights.strengths.len(), 2);
    }
}
