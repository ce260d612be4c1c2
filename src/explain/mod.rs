//! Explain bundle writer for inspecting a single assessment.
//!
//! Credit decisions need reason codes: which inputs pushed the log-odds up
//! or down, and by how much. The bundle is a timestamped markdown file with
//! the applicant's inputs, the per-feature contributions sorted by absolute
//! size, the resulting triple, and the rating band table.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::{ApplicantRecord, DerivedFeatures, Rating, RiskAssessment};
use crate::error::AppError;
use crate::features::{FEATURE_NAMES, feature_row};
use crate::model::ScorecardModel;
use crate::scorer::credit_score_from_probability;

/// One feature's share of the linear predictor.
#[derive(Debug, Clone)]
pub struct Contribution {
    pub name: &'static str,
    pub value: f64,
    pub weight: f64,
    pub log_odds: f64,
}

/// Per-feature log-odds contributions, sorted by absolute size (descending).
pub fn contributions(
    record: &ApplicantRecord,
    features: &DerivedFeatures,
    model: &ScorecardModel,
) -> Vec<Contribution> {
    let row = feature_row(record, features);
    let mut out: Vec<Contribution> = FEATURE_NAMES
        .iter()
        .zip(row.iter())
        .zip(model.weights().iter())
        .map(|((name, &value), &weight)| Contribution {
            name,
            value,
            weight,
            log_odds: weight * value,
        })
        .collect();

    out.sort_by(|a, b| {
        b.log_odds
            .abs()
            .partial_cmp(&a.log_odds.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(b.name))
    });
    out
}

/// Write the explain bundle and return its path.
pub fn write_explain_bundle(
    out_dir: &Path,
    record: &ApplicantRecord,
    features: &DerivedFeatures,
    assessment: &RiskAssessment,
    model: &ScorecardModel,
) -> Result<PathBuf, AppError> {
    create_dir_all(out_dir)
        .map_err(|e| AppError::internal(format!("Failed to create explain dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = out_dir.join(format!("pd_explain_{ts}.md"));

    let body = format_explain_bundle(record, features, assessment, model);
    let mut file = File::create(&path)
        .map_err(|e| AppError::internal(format!("Failed to create explain file: {e}")))?;
    file.write_all(body.as_bytes())
        .map_err(|e| AppError::internal(format!("Failed to write explain file: {e}")))?;

    Ok(path)
}

/// Render the bundle body.
pub fn format_explain_bundle(
    record: &ApplicantRecord,
    features: &DerivedFeatures,
    assessment: &RiskAssessment,
    model: &ScorecardModel,
) -> String {
    let mut out = String::new();

    out.push_str("# pd explain bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!(
        "- applicant: age={} income={:.0} loan={:.0} tenure={}m\n",
        record.age, record.income, record.loan_amount, record.loan_tenure_months
    ));
    out.push_str(&format!(
        "- history: dpd={} delinquency={}% utilization={}% accounts={}\n",
        record.avg_days_past_due,
        record.delinquency_ratio,
        record.credit_utilization_ratio,
        record.num_open_accounts
    ));
    out.push_str(&format!(
        "- profile: {} / {} / {}\n",
        record.residence_type.display_name(),
        record.loan_purpose.display_name(),
        record.loan_type.display_name()
    ));
    out.push_str(&format!(
        "- loan_to_income_ratio: {:.2}\n",
        features.loan_to_income_ratio
    ));

    out.push_str("\n## Log-odds contributions\n");
    out.push_str("| feature | value | weight | log-odds |\n");
    out.push_str("| - | - | - | - |\n");
    out.push_str(&format!(
        "| (intercept) | - | {:+.4} | {:+.4} |\n",
        model.intercept(),
        model.intercept()
    ));

    let contribs = contributions(record, features, model);
    let mut total = model.intercept();
    for c in &contribs {
        total += c.log_odds;
        out.push_str(&format!(
            "| {} | {:.4} | {:+.4} | {:+.4} |\n",
            c.name, c.value, c.weight, c.log_odds
        ));
    }
    out.push_str(&format!("| **total** | - | - | {total:+.4} |\n"));

    out.push_str("\n## Assessment\n");
    out.push_str(&format!(
        "- probability_of_default: {:.4}\n",
        assessment.probability_of_default
    ));
    out.push_str(&format!("- credit_score: {}\n", assessment.credit_score));
    out.push_str(&format!(
        "- rating: {}\n",
        assessment.rating.display_name()
    ));

    out.push_str("\n## Rating bands\n");
    out.push_str("| rating | probability | score |\n");
    out.push_str("| - | - | - |\n");
    let bands = model.bands();
    let scale = model.scale();
    let rows = [
        (Rating::Excellent, 0.0, bands.excellent_max),
        (Rating::Good, bands.excellent_max, bands.good_max),
        (Rating::Average, bands.good_max, bands.average_max),
        (Rating::Poor, bands.average_max, 1.0),
    ];
    for (rating, lo, hi) in rows {
        out.push_str(&format!(
            "| {} | {:.4} - {:.4} | {} - {} |\n",
            rating.display_name(),
            lo,
            hi,
            credit_score_from_probability(hi, scale),
            credit_score_from_probability(lo, scale),
        ));
    }

    out
}
