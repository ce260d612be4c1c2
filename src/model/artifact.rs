//! Read/write scorecard artifact JSON.
//!
//! The artifact is the "portable" representation of a scorecard:
//! - one named weight per design-row column, in encoding order
//! - the intercept
//! - the score scale and rating bands
//!
//! The schema is defined by [`ModelFile`]. Loading re-validates everything,
//! so a hand-edited or stale artifact surfaces as a distinguishable
//! "scorer unavailable" error instead of silently skewing assessments.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::features::FEATURE_NAMES;
use crate::model::{RatingBands, ScoreScale, ScorecardModel};

/// Environment variable naming the artifact to load instead of the embedded
/// default. A `.env` file is honoured.
pub const MODEL_ENV_VAR: &str = "PD_MODEL";

/// A named scorecard weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub name: String,
    pub weight: f64,
}

/// A saved scorecard file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub intercept: f64,
    pub features: Vec<FeatureWeight>,
    pub scale: ScoreScale,
    pub bands: RatingBands,
}

/// Convert a validated scorecard into its file representation.
pub fn to_model_file(model: &ScorecardModel) -> ModelFile {
    let features = FEATURE_NAMES
        .iter()
        .zip(model.weights().iter())
        .map(|(name, &weight)| FeatureWeight {
            name: (*name).to_string(),
            weight,
        })
        .collect();

    ModelFile {
        tool: "pd".to_string(),
        intercept: model.intercept(),
        features,
        scale: model.scale(),
        bands: model.bands(),
    }
}

/// Write a scorecard artifact JSON file.
pub fn write_model_json(path: &Path, model: &ScorecardModel) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::invalid_input(format!(
            "Failed to create model JSON '{}': {e}",
            path.display()
        ))
    })?;

    serde_json::to_writer_pretty(file, &to_model_file(model))
        .map_err(|e| AppError::invalid_input(format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read and validate a scorecard artifact JSON file.
pub fn read_model_json(path: &Path) -> Result<ScorecardModel, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::scorer_unavailable(format!(
            "Failed to open model JSON '{}': {e}",
            path.display()
        ))
    })?;
    let parsed: ModelFile = serde_json::from_reader(file)
        .map_err(|e| AppError::scorer_unavailable(format!("Invalid model JSON: {e}")))?;

    model_from_file(&parsed)
}

/// Validate a parsed artifact into a scorecard.
pub fn model_from_file(parsed: &ModelFile) -> Result<ScorecardModel, AppError> {
    if parsed.features.len() != FEATURE_NAMES.len() {
        return Err(AppError::scorer_unavailable(format!(
            "Model JSON has {} features, expected {}.",
            parsed.features.len(),
            FEATURE_NAMES.len()
        )));
    }
    for (expected, got) in FEATURE_NAMES.iter().zip(parsed.features.iter()) {
        if got.name != *expected {
            return Err(AppError::scorer_unavailable(format!(
                "Model JSON feature order mismatch: expected `{expected}`, found `{}`.",
                got.name
            )));
        }
    }

    let weights: Vec<f64> = parsed.features.iter().map(|f| f.weight).collect();
    ScorecardModel::new(weights, parsed.intercept, parsed.scale, parsed.bands)
}

/// Resolve the scorecard once at startup.
///
/// If [`MODEL_ENV_VAR`] is set, the file it names must load and validate;
/// otherwise the embedded default scorecard is used.
pub fn model_from_env() -> Result<ScorecardModel, AppError> {
    dotenvy::dotenv().ok();
    match std::env::var(MODEL_ENV_VAR) {
        Ok(path) => read_model_json(Path::new(&path)),
        Err(_) => Ok(ScorecardModel::embedded()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_round_trip_preserves_the_model() {
        let model = ScorecardModel::embedded();
        let file = to_model_file(&model);
        let back = model_from_file(&file).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn file_with_shuffled_feature_order_is_rejected() {
        let model = ScorecardModel::embedded();
        let mut file = to_model_file(&model);
        file.features.swap(0, 1);
        let err = model_from_file(&file).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn file_with_missing_features_is_rejected() {
        let model = ScorecardModel::embedded();
        let mut file = to_model_file(&model);
        file.features.pop();
        assert!(model_from_file(&file).is_err());
    }

    #[test]
    fn missing_artifact_path_is_a_scorer_unavailable_fault() {
        let err = read_model_json(Path::new("does/not/exist.json")).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
