//! Risk scoring: default probability, credit score, rating.
//!
//! The scorer owns an immutable [`ScorecardModel`] injected at construction
//! and exposes one combined entry point, [`RiskScorer::assess`], plus the
//! two-step form used when the caller already derived features.
//!
//! Output mapping (fixed per model):
//! - `credit_score = round(min + (1 - p) * (max - min))`, clamped to the
//!   scale bounds (monotonically decreasing in the probability)
//! - `rating` from the model's probability bands
//!
//! Scoring is deterministic and total: any record that passes boundary
//! validation produces an assessment, never an error.

use crate::domain::{ApplicantRecord, DerivedFeatures, RiskAssessment};
use crate::error::AppError;
use crate::features::{derive, feature_row};
use crate::model::artifact::model_from_env;
use crate::model::{ScoreScale, ScorecardModel};

pub struct RiskScorer {
    model: ScorecardModel,
}

impl RiskScorer {
    pub fn new(model: ScorecardModel) -> Self {
        Self { model }
    }

    /// Build a scorer from the environment-resolved scorecard (or the
    /// embedded default). The artifact is read once, here, never per request.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(model_from_env()?))
    }

    pub fn model(&self) -> &ScorecardModel {
        &self.model
    }

    /// Score a record whose derived features were computed by the caller.
    pub fn score(
        &self,
        record: &ApplicantRecord,
        features: &DerivedFeatures,
    ) -> RiskAssessment {
        let row = feature_row(record, features);
        let probability = self.model.predict_probability(&row);

        RiskAssessment {
            probability_of_default: probability,
            credit_score: credit_score_from_probability(probability, self.model.scale()),
            rating: self.model.bands().classify(probability),
        }
    }

    /// The single entry point of the core: derive features, then score.
    pub fn assess(&self, record: &ApplicantRecord) -> RiskAssessment {
        let features = derive(record);
        self.score(record, &features)
    }
}

/// Map a default probability onto the credit score scale.
pub fn credit_score_from_probability(probability: f64, scale: ScoreScale) -> u32 {
    let raw = scale.min as f64 + (1.0 - probability) * scale.span();
    (raw.round() as i64).clamp(scale.min as i64, scale.max as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoanPurpose, LoanType, Rating, ResidenceType, validate_record};
    use crate::model::DEFAULT_SCALE;

    fn base_record() -> ApplicantRecord {
        ApplicantRecord {
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
        }
    }

    fn record_grid() -> Vec<ApplicantRecord> {
        let mut out = Vec::new();
        for &age in &[18, 28, 55, 100] {
            for &delinq in &[0, 30, 100] {
                for &util in &[0, 50, 100] {
                    for &loan_type in &LoanType::ALL {
                        let mut r = base_record();
                        r.age = age;
                        r.delinquency_ratio = delinq;
                        r.credit_utilization_ratio = util;
                        r.loan_type = loan_type;
                        out.push(r);
                    }
                }
            }
        }
        out
    }

    #[test]
    fn probability_stays_in_range_across_the_domain() {
        let scorer = RiskScorer::new(ScorecardModel::embedded());
        for r in record_grid() {
            validate_record(&r).unwrap();
            let a = scorer.assess(&r);
            assert!(
                (0.0..=1.0).contains(&a.probability_of_default),
                "p = {} out of range",
                a.probability_of_default
            );
            assert!(a.credit_score >= DEFAULT_SCALE.min && a.credit_score <= DEFAULT_SCALE.max);
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let scorer = RiskScorer::new(ScorecardModel::embedded());
        let r = base_record();
        let a = scorer.assess(&r);
        let b = scorer.assess(&r);
        assert_eq!(
            a.probability_of_default.to_bits(),
            b.probability_of_default.to_bits()
        );
        assert_eq!(a.credit_score, b.credit_score);
        assert_eq!(a.rating, b.rating);
    }

    #[test]
    fn higher_delinquency_never_lowers_the_probability() {
        let scorer = RiskScorer::new(ScorecardModel::embedded());
        let mut low = base_record();
        low.delinquency_ratio = 10;
        let mut high = base_record();
        high.delinquency_ratio = 80;

        let p_low = scorer.assess(&low).probability_of_default;
        let p_high = scorer.assess(&high).probability_of_default;
        assert!(p_high >= p_low, "p({p_high}) < p({p_low})");
    }

    #[test]
    fn higher_utilization_and_leverage_raise_the_probability() {
        let scorer = RiskScorer::new(ScorecardModel::embedded());

        let mut lean = base_record();
        lean.credit_utilization_ratio = 5;
        let mut maxed = base_record();
        maxed.credit_utilization_ratio = 95;
        assert!(
            scorer.assess(&maxed).probability_of_default
                > scorer.assess(&lean).probability_of_default
        );

        let mut small_loan = base_record();
        small_loan.loan_amount = 600_000.0;
        let mut big_loan = base_record();
        big_loan.loan_amount = 6_000_000.0;
        assert!(
            scorer.assess(&big_loan).probability_of_default
                > scorer.assess(&small_loan).probability_of_default
        );
    }

    #[test]
    fn showcase_record_reproduces_the_golden_triple() {
        let scorer = RiskScorer::new(ScorecardModel::embedded());
        let r = base_record();
        let features = derive(&r);
        assert_eq!(format!("{:.2}", features.loan_to_income_ratio), "2.13");

        let a = scorer.score(&r, &features);
        assert!(
            (a.probability_of_default - 0.641642).abs() < 1e-4,
            "p = {}",
            a.probability_of_default
        );
        assert_eq!(a.credit_score, 515);
        assert_eq!(a.rating, Rating::Average);
    }

    #[test]
    fn score_endpoints_clamp_to_the_scale() {
        assert_eq!(credit_score_from_probability(0.0, DEFAULT_SCALE), 900);
        assert_eq!(credit_score_from_probability(1.0, DEFAULT_SCALE), 300);
        // Out-of-range probabilities cannot escape the scale either.
        assert_eq!(credit_score_from_probability(-0.5, DEFAULT_SCALE), 900);
        assert_eq!(credit_score_from_probability(1.5, DEFAULT_SCALE), 300);
    }

    #[test]
    fn lower_scores_never_pair_with_better_ratings() {
        let model = ScorecardModel::embedded();
        let probes: Vec<f64> = (0..=1000).map(|i| i as f64 / 1000.0).collect();
        let outcomes: Vec<(u32, Rating)> = probes
            .iter()
            .map(|&p| {
                (
                    credit_score_from_probability(p, model.scale()),
                    model.bands().classify(p),
                )
            })
            .collect();

        for (a, b) in outcomes.iter().zip(outcomes.iter().skip(1)) {
            // Probability increases along the grid: scores must not rise and
            // ratings must not improve.
            assert!(a.0 >= b.0, "score rose with probability: {a:?} -> {b:?}");
            assert!(a.1 >= b.1, "rating improved with probability: {a:?} -> {b:?}");
        }
    }
}
