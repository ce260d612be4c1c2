//! Export applicants and scored results to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts, and the applicant export round-trips through `ingest`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{ApplicantRecord, ApplicantRow, ScoredApplicant};
use crate::error::AppError;

/// Write per-applicant scored results to a CSV file.
pub fn write_scored_csv(path: &Path, scored: &[ScoredApplicant]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::invalid_input(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "id,age,income,loan_amount,loan_tenure_months,avg_days_past_due,delinquency_ratio,\
         credit_utilization_ratio,num_open_accounts,residence_type,loan_purpose,loan_type,\
         loan_to_income_ratio,probability_of_default,credit_score,rating"
    )
    .map_err(|e| AppError::invalid_input(format!("Failed to write export CSV header: {e}")))?;

    for s in scored {
        writeln!(
            file,
            "{},{},{:.2},{:.4},{},{}",
            s.id,
            record_fields(&s.record),
            s.features.loan_to_income_ratio,
            s.assessment.probability_of_default,
            s.assessment.credit_score,
            s.assessment.rating.display_name(),
        )
        .map_err(|e| AppError::invalid_input(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write an applicant CSV (the `ingest` schema), optionally with labels.
pub fn write_applicants_csv(
    path: &Path,
    rows: &[ApplicantRow],
    include_labels: bool,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::invalid_input(format!(
            "Failed to create applicant CSV '{}': {e}",
            path.display()
        ))
    })?;

    let mut header = String::from(
        "id,age,income,loan_amount,loan_tenure_months,avg_days_past_due,delinquency_ratio,\
         credit_utilization_ratio,num_open_accounts,residence_type,loan_purpose,loan_type",
    );
    if include_labels {
        header.push_str(",defaulted");
    }
    writeln!(file, "{header}")
        .map_err(|e| AppError::invalid_input(format!("Failed to write applicant CSV header: {e}")))?;

    for row in rows {
        let mut line = format!("{},{}", row.id, record_fields(&row.record));
        if include_labels {
            let label = match row.defaulted {
                Some(true) => "1",
                Some(false) => "0",
                None => "",
            };
            line.push(',');
            line.push_str(label);
        }
        writeln!(file, "{line}")
            .map_err(|e| AppError::invalid_input(format!("Failed to write applicant CSV row: {e}")))?;
    }

    Ok(())
}

fn record_fields(record: &ApplicantRecord) -> String {
    format!(
        "{},{:.0},{:.0},{},{},{},{},{},{},{},{}",
        record.age,
        record.income,
        record.loan_amount,
        record.loan_tenure_months,
        record.avg_days_past_due,
        record.delinquency_ratio,
        record.credit_utilization_ratio,
        record.num_open_accounts,
        record.residence_type.display_name(),
        record.loan_purpose.display_name(),
        record.loan_type.display_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoanPurpose, LoanType, ResidenceType};

    #[test]
    fn record_fields_match_the_ingest_schema_order() {
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
        assert_eq!(
            record_fields(&record),
            "28,1200000,2560000,36,20,30,30,2,Owned,Education,Unsecured"
        );
    }
}
