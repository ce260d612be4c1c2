//! Reporting utilities: rankings, portfolio stats, and formatted terminal
//! output.
//!
//! We keep formatting code in one place so:
//! - the scoring code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{
    ApplicantRecord, DerivedFeatures, Rating, RiskAssessment, ScoredApplicant,
};
use crate::io::ingest::IngestedApplicants;
use crate::model::ScorecardModel;

/// Riskiest/safest rankings (top-N each side).
#[derive(Debug, Clone)]
pub struct Rankings {
    pub riskiest: Vec<ScoredApplicant>,
    pub safest: Vec<ScoredApplicant>,
}

/// Summary stats over a scored batch.
#[derive(Debug, Clone)]
pub struct PortfolioStats {
    pub n: usize,
    pub p_min: f64,
    pub p_mean: f64,
    pub p_max: f64,
    pub score_min: u32,
    pub score_max: u32,
    /// Counts indexed in `Rating::ALL` order (Poor first).
    pub rating_counts: [usize; 4],
}

/// Rank the top riskiest and safest applicants by default probability.
///
/// Ties break by id so the ordering is deterministic across runs.
pub fn rank_extremes(scored: &[ScoredApplicant], top_n: usize) -> Rankings {
    let mut by_risk = scored.to_vec();
    by_risk.sort_by(|a, b| {
        b.assessment
            .probability_of_default
            .partial_cmp(&a.assessment.probability_of_default)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let riskiest = by_risk.iter().take(top_n).cloned().collect();
    let safest = by_risk.iter().rev().take(top_n).cloned().collect();

    Rankings { riskiest, safest }
}

/// Compute portfolio stats; `None` on an empty batch.
pub fn portfolio_stats(scored: &[ScoredApplicant]) -> Option<PortfolioStats> {
    if scored.is_empty() {
        return None;
    }

    let mut p_min = f64::INFINITY;
    let mut p_max = f64::NEG_INFINITY;
    let mut p_sum = 0.0;
    let mut score_min = u32::MAX;
    let mut score_max = 0;
    let mut rating_counts = [0usize; 4];

    for s in scored {
        let p = s.assessment.probability_of_default;
        p_min = p_min.min(p);
        p_max = p_max.max(p);
        p_sum += p;
        score_min = score_min.min(s.assessment.credit_score);
        score_max = score_max.max(s.assessment.credit_score);
        let idx = Rating::ALL
            .iter()
            .position(|&r| r == s.assessment.rating)?;
        rating_counts[idx] += 1;
    }

    Some(PortfolioStats {
        n: scored.len(),
        p_min,
        p_mean: p_sum / scored.len() as f64,
        p_max,
        score_min,
        score_max,
        rating_counts,
    })
}

/// Format a single-applicant assessment report.
pub fn format_assessment(
    record: &ApplicantRecord,
    features: &DerivedFeatures,
    assessment: &RiskAssessment,
) -> String {
    let mut out = String::new();

    out.push_str("=== pd - Credit Risk Assessment ===\n");
    out.push_str(&format!(
        "Applicant: age={} | income={:.0} | loan={:.0} | tenure={}m\n",
        record.age, record.income, record.loan_amount, record.loan_tenure_months
    ));
    out.push_str(&format!(
        "History: dpd={} | delinquency={}% | utilization={}% | open accounts={}\n",
        record.avg_days_past_due,
        record.delinquency_ratio,
        record.credit_utilization_ratio,
        record.num_open_accounts
    ));
    out.push_str(&format!(
        "Profile: {} | {} | {}\n",
        record.residence_type.display_name(),
        record.loan_purpose.display_name(),
        record.loan_type.display_name()
    ));
    out.push_str(&format!(
        "Loan to income ratio: {:.2}\n",
        features.loan_to_income_ratio
    ));

    out.push_str("\nRisk assessment:\n");
    out.push_str(&format!(
        "- Default probability: {:.1}% ({:.4})\n",
        assessment.probability_of_default * 100.0,
        assessment.probability_of_default
    ));
    out.push_str(&format!("- Credit score: {}\n", assessment.credit_score));
    out.push_str(&format!(
        "- Rating: {}\n",
        assessment.rating.display_name()
    ));

    out
}

/// Format the batch run summary (ingest counts + portfolio stats).
pub fn format_batch_summary(ingest: &IngestedApplicants, stats: &PortfolioStats) -> String {
    let mut out = String::new();

    out.push_str("=== pd - Batch Scoring ===\n");
    out.push_str(&format!(
        "Rows: read={} | scored={} | skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    for e in &ingest.row_errors {
        let id = e.id.as_deref().unwrap_or("-");
        out.push_str(&format!("  (line {} id {id}) {}\n", e.line, e.message));
    }

    out.push_str(&format!(
        "Default probability: min={:.4} | mean={:.4} | max={:.4}\n",
        stats.p_min, stats.p_mean, stats.p_max
    ));
    out.push_str(&format!(
        "Credit score: min={} | max={}\n",
        stats.score_min, stats.score_max
    ));

    out.push_str("Ratings:");
    for (rating, count) in Rating::ALL.iter().zip(stats.rating_counts.iter()) {
        out.push_str(&format!(" {}={count}", rating.display_name()));
    }
    out.push('\n');

    out
}

/// Format the riskiest/safest tables.
pub fn format_rankings(rankings: &Rankings) -> String {
    let mut out = String::new();

    out.push_str("Top riskiest (highest default probability):\n");
    out.push_str(&format_table(&rankings.riskiest));
    out.push('\n');

    out.push_str("Top safest (lowest default probability):\n");
    out.push_str(&format_table(&rankings.safest));

    out
}

/// Format the active scorecard (used by `pd model` and after calibration).
pub fn format_model_summary(model: &ScorecardModel) -> String {
    let mut out = String::new();

    out.push_str("=== pd - Scorecard ===\n");
    out.push_str(&format!("Intercept: {:+.6}\n", model.intercept()));
    out.push_str("Weights:\n");
    for (name, weight) in crate::features::FEATURE_NAMES.iter().zip(model.weights()) {
        out.push_str(&format!("  {name:<26} {weight:>+10.6}\n"));
    }

    let scale = model.scale();
    out.push_str(&format!("Score scale: {} - {}\n", scale.min, scale.max));

    let bands = model.bands();
    out.push_str("Rating bands (by default probability):\n");
    out.push_str(&format!(
        "  Excellent: p <= {:.4}\n",
        bands.excellent_max
    ));
    out.push_str(&format!(
        "  Good:      {:.4} < p <= {:.4}\n",
        bands.excellent_max, bands.good_max
    ));
    out.push_str(&format!(
        "  Average:   {:.4} < p <= {:.4}\n",
        bands.good_max, bands.average_max
    ));
    out.push_str(&format!("  Poor:      p > {:.4}\n", bands.average_max));

    out
}

fn format_table(rows: &[ScoredApplicant]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:>8} {:>12} {:>8} {:<10}\n",
        "id", "pd", "loan/income", "score", "rating"
    ));
    out.push_str(&format!(
        "{:-<24} {:-<8} {:-<12} {:-<8} {:-<10}\n",
        "", "", "", "", ""
    ));

    for s in rows {
        out.push_str(&format!(
            "{:<24} {:>8.4} {:>12.2} {:>8} {:<10}\n",
            truncate(&s.id, 24),
            s.assessment.probability_of_default,
            s.features.loan_to_income_ratio,
            s.assessment.credit_score,
            s.assessment.rating.display_name(),
        ));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoanPurpose, LoanType, ResidenceType};
    use crate::features::derive;
    use crate::model::ScorecardModel;
    use crate::scorer::RiskScorer;

    fn scored(id: &str, delinquency: u32) -> ScoredApplicant {
        let record = ApplicantRecord {
            age: 28,
            income: 1_200_000.0,
            loan_amount: 2_560_000.0,
            loan_tenure_months: 36,
            avg_days_past_due: 20,
            delinquency_ratio: delinquency,
            credit_utilization_ratio: 30,
            num_open_accounts: 2,
            residence_type: ResidenceType::Owned,
            loan_purpose: LoanPurpose::Education,
            loan_type: LoanType::Unsecured,
        };
        let features = derive(&record);
        let assessment = RiskScorer::new(ScorecardModel::embedded()).score(&record, &features);
        ScoredApplicant {
            id: id.to_string(),
            record,
            features,
            assessment,
        }
    }

    #[test]
    fn rank_extremes_orders_by_probability() {
        let batch = vec![scored("mid", 30), scored("high", 90), scored("low", 0)];
        let rankings = rank_extremes(&batch, 2);

        assert_eq!(rankings.riskiest.len(), 2);
        assert_eq!(rankings.riskiest[0].id, "high");
        assert_eq!(rankings.safest[0].id, "low");
    }

    #[test]
    fn portfolio_stats_cover_the_batch() {
        let batch = vec![scored("a", 0), scored("b", 50), scored("c", 100)];
        let stats = portfolio_stats(&batch).unwrap();
        assert_eq!(stats.n, 3);
        assert!(stats.p_min <= stats.p_mean && stats.p_mean <= stats.p_max);
        assert_eq!(stats.rating_counts.iter().sum::<usize>(), 3);
        assert!(portfolio_stats(&[]).is_none());
    }

    #[test]
    fn assessment_report_shows_the_headline_numbers() {
        let s = scored("a", 30);
        let text = format_assessment(&s.record, &s.features, &s.assessment);
        assert!(text.contains("Loan to income ratio: 2.13"), "{text}");
        assert!(text.contains("Credit score: 515"), "{text}");
        assert!(text.contains("Rating: Average"), "{text}");
    }

    #[test]
    fn model_summary_lists_every_feature() {
        let text = format_model_summary(&ScorecardModel::embedded());
        for name in crate::features::FEATURE_NAMES {
            assert!(text.contains(name), "missing `{name}` in summary");
        }
    }

    #[test]
    fn truncate_caps_long_ids() {
        assert_eq!(truncate("short", 10), "short");
        let t = truncate("a-very-long-applicant-id", 10);
        assert_eq!(t.chars().count(), 10);
        assert!(t.ends_with('.'));
    }
}
