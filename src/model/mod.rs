//! The scorecard model.
//!
//! A scorecard bundles everything the scorer needs, loaded once and treated
//! as immutable afterwards:
//! - a linear predictor (one weight per design-row column, plus an intercept)
//! - the credit score scale the probability is mapped onto
//! - the probability bands that assign ratings
//!
//! The embedded default scorecard is a documented calibration choice: a
//! 300-900 score scale, with rating bands expressed as probability
//! thresholds whose edges land on scores 750 / 650 / 500. Artifacts may
//! recalibrate both, subject to validation.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::domain::Rating;
use crate::error::AppError;
use crate::features::NUM_FEATURES;
use crate::math::sigmoid;

pub mod artifact;

/// Credit score scale bounds (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreScale {
    pub min: u32,
    pub max: u32,
}

impl ScoreScale {
    pub fn span(self) -> f64 {
        (self.max - self.min) as f64
    }
}

/// Probability band upper bounds for rating assignment.
///
/// Bands are non-overlapping and exhaustive over `[0, 1]`; a boundary value
/// belongs to the better band (`p == excellent_max` is still Excellent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingBands {
    pub excellent_max: f64,
    pub good_max: f64,
    pub average_max: f64,
}

impl RatingBands {
    /// Assign the rating for a default probability.
    pub fn classify(&self, probability: f64) -> Rating {
        if probability <= self.excellent_max {
            Rating::Excellent
        } else if probability <= self.good_max {
            Rating::Good
        } else if probability <= self.average_max {
            Rating::Average
        } else {
            Rating::Poor
        }
    }
}

/// Default scorecard weights, one per `FEATURE_NAMES` entry.
///
/// Signs encode the directional risk signals: delinquency, utilization,
/// leverage, DPD, tenure, account count and unsecured lending push the
/// default probability up; age and income pull it down; residence and
/// purpose dummies adjust relative to the Owned / Education reference.
pub const DEFAULT_WEIGHTS: [f64; NUM_FEATURES] = [
    -0.6, // age
    -0.5, // income
    0.3,  // loan_tenure_months
    1.2,  // avg_days_past_due
    1.6,  // delinquency_ratio
    1.4,  // credit_utilization_ratio
    0.45, // num_open_accounts
    1.8,  // loan_to_income_ratio
    0.35, // residence_rented
    0.15, // residence_mortgage
    -0.2, // purpose_home
    0.1,  // purpose_auto
    0.4,  // purpose_personal
    0.5,  // loan_type_unsecured
];

/// Default scorecard intercept (baseline log-odds).
pub const DEFAULT_INTERCEPT: f64 = -1.47;

/// Default credit score scale.
pub const DEFAULT_SCALE: ScoreScale = ScoreScale { min: 300, max: 900 };

/// Default rating bands, chosen so the band edges land on credit scores
/// 750 / 650 / 500 under the default scale.
pub const DEFAULT_BANDS: RatingBands = RatingBands {
    excellent_max: 0.25,
    good_max: 5.0 / 12.0,
    average_max: 2.0 / 3.0,
};

/// An immutable, validated scorecard.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorecardModel {
    weights: DVector<f64>,
    intercept: f64,
    scale: ScoreScale,
    bands: RatingBands,
}

impl ScorecardModel {
    /// Build a scorecard, validating every parameter.
    ///
    /// A scorecard that fails validation is the "scorer unavailable" fault:
    /// the caller gets a distinguishable error (exit code 3) rather than a
    /// fabricated assessment.
    pub fn new(
        weights: Vec<f64>,
        intercept: f64,
        scale: ScoreScale,
        bands: RatingBands,
    ) -> Result<Self, AppError> {
        if weights.len() != NUM_FEATURES {
            return Err(AppError::scorer_unavailable(format!(
                "Scorecard has {} weights, expected {NUM_FEATURES}.",
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) || !intercept.is_finite() {
            return Err(AppError::scorer_unavailable(
                "Scorecard weights must all be finite.",
            ));
        }
        if scale.min >= scale.max {
            return Err(AppError::scorer_unavailable(format!(
                "Invalid score scale [{}, {}] (min must be < max).",
                scale.min, scale.max
            )));
        }
        let ordered = 0.0 < bands.excellent_max
            && bands.excellent_max < bands.good_max
            && bands.good_max < bands.average_max
            && bands.average_max < 1.0;
        if !ordered {
            return Err(AppError::scorer_unavailable(
                "Invalid rating bands (thresholds must be strictly ordered inside (0, 1)).",
            ));
        }

        Ok(Self {
            weights: DVector::from_row_slice(&weights),
            intercept,
            scale,
            bands,
        })
    }

    /// The embedded default scorecard. Always valid by construction.
    pub fn embedded() -> Self {
        Self {
            weights: DVector::from_row_slice(&DEFAULT_WEIGHTS),
            intercept: DEFAULT_INTERCEPT,
            scale: DEFAULT_SCALE,
            bands: DEFAULT_BANDS,
        }
    }

    pub fn weights(&self) -> &[f64] {
        self.weights.as_slice()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn scale(&self) -> ScoreScale {
        self.scale
    }

    pub fn bands(&self) -> RatingBands {
        self.bands
    }

    /// Evaluate the linear predictor (log-odds) for a design row.
    pub fn linear_predictor(&self, row: &[f64]) -> f64 {
        let x = DVector::from_row_slice(row);
        self.intercept + self.weights.dot(&x)
    }

    /// Predicted default probability for a design row. Always in `[0, 1]`.
    pub fn predict_probability(&self, row: &[f64]) -> f64 {
        sigmoid(self.linear_predictor(row))
    }
}
