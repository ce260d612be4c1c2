//! Feature derivation and scorecard encoding.
//!
//! The scorer relies on two primitive operations:
//! - derive the ratio features a raw record does not carry
//! - build the fixed design row consumed by the scorecard's linear predictor
//!
//! Both are pure functions of the record. Keeping the encoding here means the
//! scorer, the calibration trainer, and the explain bundle all see exactly the
//! same design row.

use crate::domain::{
    AGE_MAX, AGE_MIN, ApplicantRecord, DerivedFeatures, LoanPurpose, LoanType,
    OPEN_ACCOUNTS_MAX, OPEN_ACCOUNTS_MIN, ResidenceType,
};

/// Number of columns in the scorecard design row.
pub const NUM_FEATURES: usize = 14;

/// Column names, in design-row order. Artifacts store one weight per name,
/// in this order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "age",
    "income",
    "loan_tenure_months",
    "avg_days_past_due",
    "delinquency_ratio",
    "credit_utilization_ratio",
    "num_open_accounts",
    "loan_to_income_ratio",
    "residence_rented",
    "residence_mortgage",
    "purpose_home",
    "purpose_auto",
    "purpose_personal",
    "loan_type_unsecured",
];

/// Incomes at or above this saturate the scaled income feature.
pub const INCOME_CAP: f64 = 5_000_000.0;
/// Tenures at or above this many months saturate the scaled tenure feature.
pub const TENURE_CAP_MONTHS: f64 = 240.0;
/// Average DPD at or above this many days saturates the scaled DPD feature.
pub const DPD_CAP_DAYS: f64 = 90.0;
/// Loan-to-income ratios at or above this saturate the scaled ratio feature.
pub const LTI_CAP: f64 = 10.0;

/// Compute the derived features for a record.
///
/// `loan_to_income_ratio` is `loan_amount / income`; a zero income yields a
/// ratio of `0.0` by policy rather than an error or an infinity.
pub fn derive(record: &ApplicantRecord) -> DerivedFeatures {
    let loan_to_income_ratio = if record.income > 0.0 {
        record.loan_amount / record.income
    } else {
        0.0
    };
    DerivedFeatures {
        loan_to_income_ratio,
    }
}

/// Fill the scorecard design row for a record.
///
/// Numeric fields are min-max scaled over their declared domain (with
/// saturating caps for the open-ended ones) so every column lies in `[0, 1]`
/// for in-domain records. Categorical fields are one-hot dummies against a
/// reference level (Owned / Education / Secured).
///
/// # Panics
/// Panics if `out` does not have length [`NUM_FEATURES`]. Callers should size
/// the row correctly.
pub fn fill_feature_row(record: &ApplicantRecord, features: &DerivedFeatures, out: &mut [f64]) {
    assert_eq!(out.len(), NUM_FEATURES, "design row has a fixed width");

    out[0] = (record.age.saturating_sub(AGE_MIN)) as f64 / (AGE_MAX - AGE_MIN) as f64;
    out[1] = record.income.min(INCOME_CAP) / INCOME_CAP;
    out[2] = (record.loan_tenure_months as f64).min(TENURE_CAP_MONTHS) / TENURE_CAP_MONTHS;
    out[3] = (record.avg_days_past_due as f64).min(DPD_CAP_DAYS) / DPD_CAP_DAYS;
    out[4] = record.delinquency_ratio as f64 / 100.0;
    out[5] = record.credit_utilization_ratio as f64 / 100.0;
    out[6] = (record.num_open_accounts.saturating_sub(OPEN_ACCOUNTS_MIN)) as f64
        / (OPEN_ACCOUNTS_MAX - OPEN_ACCOUNTS_MIN) as f64;
    out[7] = features.loan_to_income_ratio.min(LTI_CAP) / LTI_CAP;

    out[8] = dummy(record.residence_type == ResidenceType::Rented);
    out[9] = dummy(record.residence_type == ResidenceType::Mortgage);
    out[10] = dummy(record.loan_purpose == LoanPurpose::Home);
    out[11] = dummy(record.loan_purpose == LoanPurpose::Auto);
    out[12] = dummy(record.loan_purpose == LoanPurpose::Personal);
    out[13] = dummy(record.loan_type == LoanType::Unsecured);
}

/// Convenience wrapper returning the design row by value.
pub fn feature_row(record: &ApplicantRecord, features: &DerivedFeatures) -> [f64; NUM_FEATURES] {
    let mut row = [0.0; NUM_FEATURES];
    fill_feature_row(record, features, &mut row);
    row
}

fn dummy(set: bool) -> f64 {
    if set { 1.0 } else { 0.0 }
}
