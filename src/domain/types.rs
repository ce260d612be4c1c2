//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during assessment
//! - exported to JSON/CSV
//! - reloaded later for batch scoring or comparisons

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Youngest acceptable applicant age (years).
pub const AGE_MIN: u32 = 18;
/// Oldest acceptable applicant age (years).
pub const AGE_MAX: u32 = 100;
/// Ratio fields are integer percentages in `[0, PCT_MAX]`.
pub const PCT_MAX: u32 = 100;
/// Minimum number of open loan accounts.
pub const OPEN_ACCOUNTS_MIN: u32 = 1;
/// Maximum number of open loan accounts.
pub const OPEN_ACCOUNTS_MAX: u32 = 4;

/// Residence status reported by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResidenceType {
    Owned,
    Rented,
    Mortgage,
}

impl ResidenceType {
    pub const ALL: [ResidenceType; 3] = [
        ResidenceType::Owned,
        ResidenceType::Rented,
        ResidenceType::Mortgage,
    ];

    /// Human-readable label for terminal output and CSV cells.
    pub fn display_name(self) -> &'static str {
        match self {
            ResidenceType::Owned => "Owned",
            ResidenceType::Rented => "Rented",
            ResidenceType::Mortgage => "Mortgage",
        }
    }

    /// Parse a CSV/user-supplied value (case-insensitive).
    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owned" => Some(ResidenceType::Owned),
            "rented" => Some(ResidenceType::Rented),
            "mortgage" => Some(ResidenceType::Mortgage),
            _ => None,
        }
    }
}

/// Declared purpose of the requested loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoanPurpose {
    Education,
    Home,
    Auto,
    Personal,
}

impl LoanPurpose {
    pub const ALL: [LoanPurpose; 4] = [
        LoanPurpose::Education,
        LoanPurpose::Home,
        LoanPurpose::Auto,
        LoanPurpose::Personal,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            LoanPurpose::Education => "Education",
            LoanPurpose::Home => "Home",
            LoanPurpose::Auto => "Auto",
            LoanPurpose::Personal => "Personal",
        }
    }

    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "education" => Some(LoanPurpose::Education),
            "home" => Some(LoanPurpose::Home),
            "auto" => Some(LoanPurpose::Auto),
            "personal" => Some(LoanPurpose::Personal),
            _ => None,
        }
    }
}

/// Whether the loan is backed by collateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Unsecured,
    Secured,
}

impl LoanType {
    pub const ALL: [LoanType; 2] = [LoanType::Unsecured, LoanType::Secured];

    pub fn display_name(self) -> &'static str {
        match self {
            LoanType::Unsecured => "Unsecured",
            LoanType::Secured => "Secured",
        }
    }

    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unsecured" => Some(LoanType::Unsecured),
            "secured" => Some(LoanType::Secured),
            _ => None,
        }
    }
}

/// Ordinal credit rating. Better ratings compare greater.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Poor,
    Average,
    Good,
    Excellent,
}

impl Rating {
    pub const ALL: [Rating; 4] = [
        Rating::Poor,
        Rating::Average,
        Rating::Good,
        Rating::Excellent,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Rating::Poor => "Poor",
            Rating::Average => "Average",
            Rating::Good => "Good",
            Rating::Excellent => "Excellent",
        }
    }
}

/// Raw applicant inputs for one assessment request.
///
/// All fields are caller-supplied; range constraints are enforced at the
/// boundary by [`validate_record`], not inside the deriver or scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: u32,
    pub income: f64,
    pub loan_amount: f64,
    pub loan_tenure_months: u32,
    pub avg_days_past_due: u32,
    /// Integer percentage in `[0, 100]`.
    pub delinquency_ratio: u32,
    /// Integer percentage in `[0, 100]`.
    pub credit_utilization_ratio: u32,
    pub num_open_accounts: u32,
    pub residence_type: ResidenceType,
    pub loan_purpose: LoanPurpose,
    pub loan_type: LoanType,
}

/// Features computed from a record, never user-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// `loan_amount / income`, or `0.0` when `income == 0` (policy zero-guard).
    pub loan_to_income_ratio: f64,
}

/// Output of one assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Estimated probability of default, always in `[0, 1]`.
    pub probability_of_default: f64,
    /// Conventional credit score on the scorer's declared scale.
    pub credit_score: u32,
    pub rating: Rating,
}

/// One CSV row: an identified record plus an optional default label.
///
/// The label is present only when the source file carries a `defaulted`
/// column; batch scoring ignores it, calibration requires it.
#[derive(Debug, Clone)]
pub struct ApplicantRow {
    pub id: String,
    pub record: ApplicantRecord,
    pub defaulted: Option<bool>,
}

/// A scored applicant (used for ranking and exports).
#[derive(Debug, Clone)]
pub struct ScoredApplicant {
    pub id: String,
    pub record: ApplicantRecord,
    pub features: DerivedFeatures,
    pub assessment: RiskAssessment,
}

/// Validate raw fields against their declared domains.
///
/// This is the single boundary check: once a record passes, the deriver and
/// scorer assume it is in-domain and do not re-validate.
pub fn validate_record(record: &ApplicantRecord) -> Result<(), AppError> {
    if record.age < AGE_MIN || record.age > AGE_MAX {
        return Err(AppError::invalid_input(format!(
            "Invalid `age` {} (must be between {AGE_MIN} and {AGE_MAX}).",
            record.age
        )));
    }
    if !record.income.is_finite() || record.income < 0.0 {
        return Err(AppError::invalid_input(
            "Invalid `income` (must be finite and >= 0).",
        ));
    }
    if !record.loan_amount.is_finite() || record.loan_amount < 0.0 {
        return Err(AppError::invalid_input(
            "Invalid `loan_amount` (must be finite and >= 0).",
        ));
    }
    if record.delinquency_ratio > PCT_MAX {
        return Err(AppError::invalid_input(format!(
            "Invalid `delinquency_ratio` {} (must be a percentage 0-{PCT_MAX}).",
            record.delinquency_ratio
        )));
    }
    if record.credit_utilization_ratio > PCT_MAX {
        return Err(AppError::invalid_input(format!(
            "Invalid `credit_utilization_ratio` {} (must be a percentage 0-{PCT_MAX}).",
            record.credit_utilization_ratio
        )));
    }
    if record.num_open_accounts < OPEN_ACCOUNTS_MIN || record.num_open_accounts > OPEN_ACCOUNTS_MAX
    {
        return Err(AppError::invalid_input(format!(
            "Invalid `num_open_accounts` {} (must be between {OPEN_ACCOUNTS_MIN} and {OPEN_ACCOUNTS_MAX}).",
            record.num_open_accounts
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn validate_accepts_domain_boundaries() {
        let mut r = base_record();
        r.age = AGE_MIN;
        r.income = 0.0;
        r.loan_amount = 0.0;
        r.delinquency_ratio = PCT_MAX;
        r.credit_utilization_ratio = 0;
        r.num_open_accounts = OPEN_ACCOUNTS_MAX;
        assert!(validate_record(&r).is_ok());
    }

    #[test]
    fn validate_rejects_out_of_domain_fields() {
        let mut r = base_record();
        r.age = 17;
        assert_eq!(validate_record(&r).unwrap_err().exit_code(), 2);

        let mut r = base_record();
        r.income = -1.0;
        assert_eq!(validate_record(&r).unwrap_err().exit_code(), 2);

        let mut r = base_record();
        r.income = f64::NAN;
        assert!(validate_record(&r).is_err());

        let mut r = base_record();
        r.delinquency_ratio = 101;
        assert!(validate_record(&r).is_err());

        let mut r = base_record();
        r.num_open_accounts = 0;
        assert!(validate_record(&r).is_err());

        let mut r = base_record();
        r.num_open_accounts = 5;
        assert!(validate_record(&r).is_err());
    }

    #[test]
    fn rating_order_matches_credit_quality() {
        assert!(Rating::Poor < Rating::Average);
        assert!(Rating::Average < Rating::Good);
        assert!(Rating::Good < Rating::Excellent);
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!(
            ResidenceType::from_input(" OWNED "),
            Some(ResidenceType::Owned)
        );
        assert_eq!(LoanPurpose::from_input("personal"), Some(LoanPurpose::Personal));
        assert_eq!(LoanType::from_input("Secured"), Some(LoanType::Secured));
        assert_eq!(ResidenceType::from_input("hotel"), None);
    }
}
