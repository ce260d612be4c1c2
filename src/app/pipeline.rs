//! Shared assessment pipeline used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate -> derive -> score (-> stats/rankings for batches)
//!
//! The CLI can then focus on presentation (printing vs exporting).

use std::path::Path;

use rayon::prelude::*;

use crate::domain::{
    ApplicantRecord, DerivedFeatures, RiskAssessment, ScoredApplicant, validate_record,
};
use crate::error::AppError;
use crate::features::derive;
use crate::io::ingest::{IngestedApplicants, load_applicants};
use crate::report::{PortfolioStats, Rankings, portfolio_stats, rank_extremes};
use crate::scorer::RiskScorer;

/// All computed outputs of a single assessment.
#[derive(Debug, Clone)]
pub struct AssessOutput {
    pub features: DerivedFeatures,
    pub assessment: RiskAssessment,
}

/// Validate a record at the boundary, then derive and score it.
pub fn run_assess(
    record: &ApplicantRecord,
    scorer: &RiskScorer,
) -> Result<AssessOutput, AppError> {
    validate_record(record)?;
    let features = derive(record);
    let assessment = scorer.score(record, &features);
    Ok(AssessOutput {
        features,
        assessment,
    })
}

/// All computed outputs of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub ingest: IngestedApplicants,
    pub scored: Vec<ScoredApplicant>,
    pub stats: PortfolioStats,
    pub rankings: Rankings,
}

/// Ingest an applicant CSV and score every valid row.
///
/// Rows are scored in parallel; the core is pure and lock-free, so the only
/// ordering concern is presentation, and the output keeps file order.
pub fn run_batch(
    csv_path: &Path,
    top_n: usize,
    scorer: &RiskScorer,
) -> Result<BatchOutput, AppError> {
    let ingest = load_applicants(csv_path)?;

    let scored: Vec<ScoredApplicant> = ingest
        .rows
        .par_iter()
        .map(|row| {
            let features = derive(&row.record);
            let assessment = scorer.score(&row.record, &features);
            ScoredApplicant {
                id: row.id.clone(),
                record: row.record,
                features,
                assessment,
            }
        })
        .collect();

    let stats = portfolio_stats(&scored)
        .ok_or_else(|| AppError::insufficient_data("No applicants to summarize after scoring."))?;
    let rankings = rank_extremes(&scored, top_n);

    Ok(BatchOutput {
        ingest,
        scored,
        stats,
        rankings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoanPurpose, LoanType, ResidenceType};
    use crate::model::ScorecardModel;

    #[test]
    fn run_assess_rejects_out_of_domain_records_before_scoring() {
        let scorer = RiskScorer::new(ScorecardModel::embedded());
        let record = ApplicantRecord {
            age: 17,
            income: 1_200_000.0,
            loan_amount: 2_560_000.0,
            loan_tenure_months: 36,
            avg_days_past_due: 20,
            delinquency_ratio: 30,
            credit_utilization_ratio: 30,
            num_open_accounts: 2,
            residence_type: ResidenceType::Owned,
            loan_purpose: LoanPurpose::Education,
            loan_type: LoanType::Unsecured,
        };
        let err = run_assess(&record, &scorer).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn run_assess_returns_features_and_assessment() {
        let scorer = RiskScorer::new(ScorecardModel::embedded());
        let record = ApplicantRecord {
            age: 28,
            income: 1_200_000.0,
            loan_amount: 2_560_000.0,
            loan_tenure_months: 36,
            avg_days_past_due: 20,
            delinquency_ratio: 30,
            credit_utilization_ratio: 30,
            num_open_accounts: 2,
            residence_type: ResidenceType::Owned,
            loan_purpose: LoanPurpose::Education,
            loan_type: LoanType::Unsecured,
        };
        let out = run_assess(&record, &scorer).unwrap();
        assert_eq!(format!("{:.2}", out.features.loan_to_income_ratio), "2.13");
        assert_eq!(out.assessment.credit_score, 515);
    }
}
