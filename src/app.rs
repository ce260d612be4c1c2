//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the scorecard (flag, environment, or embedded default)
//! - runs assessments, batches, sampling, and calibration
//! - prints reports
//! - writes optional exports

use std::path::Path;

use clap::Parser;

use crate::cli::{
    AssessArgs, ApplicantArgs, BatchArgs, CalibrateArgs, Command, ExplainArgs, ModelArgs,
    SampleArgs,
};
use crate::data::{SampleConfig, generate_applicants};
use crate::domain::ApplicantRecord;
use crate::error::AppError;
use crate::fit::{TrainOptions, train};
use crate::model::artifact::{read_model_json, write_model_json};
use crate::scorer::RiskScorer;

pub mod pipeline;

/// Entry point for the `pd` binary.
pub fn run() -> Result<(), AppError> {
    // We want `pd --age 40 ...` to behave like `pd assess --age 40 ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while keeping the quick one-off assessment ergonomic.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Assess(args) => handle_assess(args),
        Command::Batch(args) => handle_batch(args),
        Command::Sample(args) => handle_sample(args),
        Command::Calibrate(args) => handle_calibrate(args),
        Command::Explain(args) => handle_explain(args),
        Command::Model(args) => handle_model(args),
    }
}

fn handle_assess(args: AssessArgs) -> Result<(), AppError> {
    let scorer = resolve_scorer(args.applicant.model.as_deref())?;
    let record = record_from_args(&args.applicant);
    let out = pipeline::run_assess(&record, &scorer)?;

    println!(
        "{}",
        crate::report::format_assessment(&record, &out.features, &out.assessment)
    );
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let scorer = resolve_scorer(args.model.as_deref())?;
    let run = pipeline::run_batch(&args.csv, args.top, &scorer)?;

    println!(
        "{}",
        crate::report::format_batch_summary(&run.ingest, &run.stats)
    );
    println!("{}", crate::report::format_rankings(&run.rankings));

    if let Some(path) = &args.export {
        crate::io::export::write_scored_csv(path, &run.scored)?;
        println!("Wrote {} scored rows to {}", run.scored.len(), path.display());
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let scorer = resolve_scorer(args.model.as_deref())?;
    let config = SampleConfig {
        count: args.count,
        seed: args.seed,
        labeled: args.labeled,
    };
    let rows = generate_applicants(&config, scorer.model())?;

    crate::io::export::write_applicants_csv(&args.export, &rows, args.labeled)?;
    println!(
        "Wrote {} applicants to {} (seed {}{})",
        rows.len(),
        args.export.display(),
        args.seed,
        if args.labeled { ", labeled" } else { "" }
    );
    Ok(())
}

fn handle_calibrate(args: CalibrateArgs) -> Result<(), AppError> {
    let ingest = crate::io::ingest::load_applicants(&args.csv)?;
    if !ingest.has_labels {
        return Err(AppError::insufficient_data(
            "Calibration needs a `defaulted` column in the CSV.",
        ));
    }
    for e in &ingest.row_errors {
        let id = e.id.as_deref().unwrap_or("-");
        eprintln!("(line {} id {id}) {}", e.line, e.message);
    }

    // Calibration keeps the currently active scale and bands.
    let base = resolve_scorer(None)?;
    let opts = TrainOptions {
        learning_rate: args.learning_rate,
        max_iter: args.max_iter,
        tolerance: args.tolerance,
        l2: args.l2,
    };
    let outcome = train(
        &ingest.rows,
        base.model().scale(),
        base.model().bands(),
        &opts,
    )?;

    println!(
        "Calibrated on {} rows: loss={:.6} after {} iterations{}",
        ingest.rows_used,
        outcome.final_loss,
        outcome.iterations,
        if outcome.converged { " (converged)" } else { "" }
    );
    println!("{}", crate::report::format_model_summary(&outcome.model));

    if let Some(path) = &args.export_model {
        write_model_json(path, &outcome.model)?;
        println!("Wrote model artifact to {}", path.display());
    }

    Ok(())
}

fn handle_explain(args: ExplainArgs) -> Result<(), AppError> {
    let scorer = resolve_scorer(args.applicant.model.as_deref())?;
    let record = record_from_args(&args.applicant);
    let out = pipeline::run_assess(&record, &scorer)?;

    let path = crate::explain::write_explain_bundle(
        &args.out,
        &record,
        &out.features,
        &out.assessment,
        scorer.model(),
    )?;
    println!("Wrote explain bundle to {}", path.display());
    Ok(())
}

fn handle_model(args: ModelArgs) -> Result<(), AppError> {
    let scorer = resolve_scorer(args.model.as_deref())?;
    println!("{}", crate::report::format_model_summary(scorer.model()));

    if let Some(path) = &args.export {
        write_model_json(path, scorer.model())?;
        println!("Wrote model artifact to {}", path.display());
    }
    Ok(())
}

/// Resolve the scorer: explicit `--model` flag first, then PD_MODEL / the
/// embedded default.
fn resolve_scorer(model_path: Option<&Path>) -> Result<RiskScorer, AppError> {
    match model_path {
        Some(path) => Ok(RiskScorer::new(read_model_json(path)?)),
        None => RiskScorer::from_env(),
    }
}

pub fn record_from_args(args: &ApplicantArgs) -> ApplicantRecord {
    ApplicantRecord {
        age: args.age,
        income: args.income,
        loan_amount: args.loan_amount,
        loan_tenure_months: args.loan_tenure_months,
        avg_days_past_due: args.avg_days_past_due,
        delinquency_ratio: args.delinquency_ratio,
        credit_utilization_ratio: args.credit_utilization_ratio,
        num_open_accounts: args.num_open_accounts,
        residence_type: args.residence_type,
        loan_purpose: args.loan_purpose,
        loan_type: args.loan_type,
    }
}

/// Rewrite argv so `pd` defaults to `pd assess`.
///
/// Rules:
/// - `pd`                      -> `pd assess`
/// - `pd --age 40 ...`         -> `pd assess --age 40 ...`
/// - `pd --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("assess".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "assess" | "batch" | "sample" | "calibrate" | "explain" | "model"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "assess flags".
    if arg1.starts_with('-') {
        argv.insert(1, "assess".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
