//! Command-line parsing for the credit-risk scorecard.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the scoring/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{LoanPurpose, LoanType, ResidenceType};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pd", version, about = "Credit default risk scorecard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assess a single applicant and print the risk report.
    Assess(AssessArgs),
    /// Score an applicant CSV, print portfolio stats and rankings.
    Batch(BatchArgs),
    /// Generate a synthetic applicant CSV (optionally labeled).
    Sample(SampleArgs),
    /// Fit scorecard weights to a labeled applicant CSV.
    Calibrate(CalibrateArgs),
    /// Write a markdown bundle explaining a single assessment.
    Explain(ExplainArgs),
    /// Show or export the active scorecard artifact.
    Model(ModelArgs),
}

/// Applicant fields shared by `assess` and `explain`.
///
/// Defaults describe a representative applicant profile.
#[derive(Debug, Parser, Clone)]
pub struct ApplicantArgs {
    /// Applicant age in years (18-100).
    #[arg(long, default_value_t = 28)]
    pub age: u32,

    /// Annual income (currency units).
    #[arg(long, default_value_t = 1_200_000.0)]
    pub income: f64,

    /// Requested loan amount (currency units).
    #[arg(long, default_value_t = 2_560_000.0)]
    pub loan_amount: f64,

    /// Loan tenure in months.
    #[arg(long, default_value_t = 36)]
    pub loan_tenure_months: u32,

    /// Average days past due per delinquency.
    #[arg(long, default_value_t = 20)]
    pub avg_days_past_due: u32,

    /// Delinquent payment months as a percentage of total (0-100).
    #[arg(long, default_value_t = 30)]
    pub delinquency_ratio: u32,

    /// Credit utilization percentage (0-100).
    #[arg(long, default_value_t = 30)]
    pub credit_utilization_ratio: u32,

    /// Number of open loan accounts (1-4).
    #[arg(long, default_value_t = 2)]
    pub num_open_accounts: u32,

    /// Residence type.
    #[arg(long, value_enum, default_value_t = ResidenceType::Owned)]
    pub residence_type: ResidenceType,

    /// Loan purpose.
    #[arg(long, value_enum, default_value_t = LoanPurpose::Education)]
    pub loan_purpose: LoanPurpose,

    /// Loan type.
    #[arg(long, value_enum, default_value_t = LoanType::Unsecured)]
    pub loan_type: LoanType,

    /// Load the scorecard from a JSON artifact instead of PD_MODEL / the
    /// embedded default.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,
}

/// Options for assessing a single applicant.
#[derive(Debug, Parser)]
pub struct AssessArgs {
    #[command(flatten)]
    pub applicant: ApplicantArgs,
}

/// Options for batch scoring.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// Applicant CSV to score.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Show top-N riskiest and safest applicants.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Export scored results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Load the scorecard from a JSON artifact.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,
}

/// Options for synthetic sample generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Number of applicants to generate.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Random seed for sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Include a `defaulted` label column drawn from the active model.
    #[arg(long)]
    pub labeled: bool,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub export: PathBuf,

    /// Load the scorecard from a JSON artifact.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,
}

/// Options for scorecard calibration.
#[derive(Debug, Parser)]
pub struct CalibrateArgs {
    /// Labeled applicant CSV (must carry a `defaulted` column).
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Gradient descent step size.
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Iteration cap.
    #[arg(long, default_value_t = 2000)]
    pub max_iter: usize,

    /// Stop when the loss improves by less than this between iterations.
    #[arg(long, default_value_t = 1e-7)]
    pub tolerance: f64,

    /// L2 ridge penalty strength (0 disables).
    #[arg(long, default_value_t = 0.0)]
    pub l2: f64,

    /// Export the fitted artifact to JSON.
    #[arg(long = "export-model", value_name = "JSON")]
    pub export_model: Option<PathBuf>,
}

/// Options for the explain bundle.
#[derive(Debug, Parser)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub applicant: ApplicantArgs,

    /// Output directory for the bundle.
    #[arg(long, default_value = "explain")]
    pub out: PathBuf,
}

/// Options for inspecting the scorecard.
#[derive(Debug, Parser)]
pub struct ModelArgs {
    /// Load the scorecard from a JSON artifact.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Export the active artifact to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}
