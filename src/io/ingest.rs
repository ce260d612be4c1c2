//! CSV ingest and validation.
//!
//! This module is responsible for turning an applicant-list CSV into clean
//! [`ApplicantRow`]s that are safe to score or calibrate on.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (rows keep file order)
//! - **Separation of concerns**: no scoring logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{
    ApplicantRecord, ApplicantRow, LoanPurpose, LoanType, ResidenceType, validate_record,
};
use crate::error::AppError;

/// Required columns, in the order the exporter writes them.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "id",
    "age",
    "income",
    "loan_amount",
    "loan_tenure_months",
    "avg_days_past_due",
    "delinquency_ratio",
    "credit_utilization_ratio",
    "num_open_accounts",
    "residence_type",
    "loan_purpose",
    "loan_type",
];

/// Optional label column consumed by calibration.
pub const LABEL_COLUMN: &str = "defaulted";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: validated rows + row errors + counts.
#[derive(Debug, Clone)]
pub struct IngestedApplicants {
    pub rows: Vec<ApplicantRow>,
    /// Whether the file carries a `defaulted` column.
    pub has_labels: bool,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and validate an applicant CSV.
pub fn load_applicants(path: &Path) -> Result<IngestedApplicants, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;
    let has_labels = header_map.contains_key(LABEL_COLUMN);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, has_labels) {
            Ok(row) => rows.push(row),
            Err((id, message)) => row_errors.push(RowError { line, id, message }),
        }
    }

    let rows_used = rows.len();
    if rows_used == 0 {
        return Err(AppError::insufficient_data(
            "No valid applicant rows remain after validation.",
        ));
    }

    Ok(IngestedApplicants {
        rows,
        has_labels,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿id"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::invalid_input(format!(
                "Missing required column: `{name}`"
            )));
        }
    }
    Ok(())
}

type RowFailure = (Option<String>, String);

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    has_labels: bool,
) -> Result<ApplicantRow, RowFailure> {
    let id = get_required(record, header_map, "id")
        .map_err(|m| (None, m))?
        .to_string();
    let fail = |message: String| (Some(id.clone()), message);

    let age = parse_u32(record, header_map, "age").map_err(&fail)?;
    let income = parse_f64(record, header_map, "income").map_err(&fail)?;
    let loan_amount = parse_f64(record, header_map, "loan_amount").map_err(&fail)?;
    let loan_tenure_months =
        parse_u32(record, header_map, "loan_tenure_months").map_err(&fail)?;
    let avg_days_past_due =
        parse_u32(record, header_map, "avg_days_past_due").map_err(&fail)?;
    let delinquency_ratio =
        parse_u32(record, header_map, "delinquency_ratio").map_err(&fail)?;
    let credit_utilization_ratio =
        parse_u32(record, header_map, "credit_utilization_ratio").map_err(&fail)?;
    let num_open_accounts =
        parse_u32(record, header_map, "num_open_accounts").map_err(&fail)?;

    let residence_raw = get_required(record, header_map, "residence_type").map_err(&fail)?;
    let residence_type = ResidenceType::from_input(residence_raw)
        .ok_or_else(|| fail(format!("Unknown `residence_type` '{residence_raw}'.")))?;

    let purpose_raw = get_required(record, header_map, "loan_purpose").map_err(&fail)?;
    let loan_purpose = LoanPurpose::from_input(purpose_raw)
        .ok_or_else(|| fail(format!("Unknown `loan_purpose` '{purpose_raw}'.")))?;

    let type_raw = get_required(record, header_map, "loan_type").map_err(&fail)?;
    let loan_type = LoanType::from_input(type_raw)
        .ok_or_else(|| fail(format!("Unknown `loan_type` '{type_raw}'.")))?;

    let applicant = ApplicantRecord {
        age,
        income,
        loan_amount,
        loan_tenure_months,
        avg_days_past_due,
        delinquency_ratio,
        credit_utilization_ratio,
        num_open_accounts,
        residence_type,
        loan_purpose,
        loan_type,
    };
    validate_record(&applicant).map_err(|e| fail(e.to_string()))?;

    let defaulted = if has_labels {
        let raw = get_required(record, header_map, LABEL_COLUMN).map_err(&fail)?;
        Some(parse_label(raw).map_err(&fail)?)
    } else {
        None
    };

    Ok(ApplicantRow {
        id,
        record: applicant,
        defaulted,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_u32(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<u32, String> {
    let raw = get_required(record, header_map, name)?;
    raw.parse::<u32>()
        .map_err(|_| format!("Invalid `{name}` '{raw}' (expected a non-negative integer)."))
}

fn parse_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<f64, String> {
    let raw = get_required(record, header_map, name)?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` '{raw}' (expected a number)."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Invalid `{name}` '{raw}' (must be finite)."))
    }
}

fn parse_label(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(format!("Invalid `defaulted` '{other}' (expected 0/1).")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_record() -> StringRecord {
        let mut names: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        names.push(LABEL_COLUMN);
        StringRecord::from(names)
    }

    fn data_record(delinquency: &str, residence: &str, label: &str) -> StringRecord {
        StringRecord::from(vec![
            "A-1",
            "28",
            "1200000",
            "2560000",
            "36",
            "20",
            delinquency,
            "30",
            "2",
            residence,
            "education",
            "unsecured",
            label,
        ])
    }

    #[test]
    fn parse_row_accepts_a_clean_labeled_row() {
        let header_map = build_header_map(&header_record());
        let row = parse_row(&data_record("30", "Owned", "1"), &header_map, true).unwrap();
        assert_eq!(row.id, "A-1");
        assert_eq!(row.record.delinquency_ratio, 30);
        assert_eq!(row.record.residence_type, ResidenceType::Owned);
        assert_eq!(row.defaulted, Some(true));
    }

    #[test]
    fn parse_row_reports_domain_violations_with_the_id() {
        let header_map = build_header_map(&header_record());
        let (id, message) =
            parse_row(&data_record("130", "Owned", "0"), &header_map, true).unwrap_err();
        assert_eq!(id.as_deref(), Some("A-1"));
        assert!(message.contains("delinquency_ratio"), "message: {message}");
    }

    #[test]
    fn parse_row_rejects_unknown_enums_and_bad_labels() {
        let header_map = build_header_map(&header_record());
        assert!(parse_row(&data_record("30", "houseboat", "0"), &header_map, true).is_err());
        assert!(parse_row(&data_record("30", "Owned", "maybe"), &header_map, true).is_err());
    }

    #[test]
    fn missing_columns_are_a_schema_error() {
        let headers = StringRecord::from(vec!["id", "age"]);
        let err = ensure_required_columns_exist(&build_header_map(&headers)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn header_normalization_strips_bom_and_case() {
        assert_eq!(normalize_header_name("\u{feff}ID"), "id");
        assert_eq!(normalize_header_name("  Loan_Amount "), "loan_amount");
    }
}
