//! Scorecard calibration.
//!
//! Given labeled applicants, we fit the scorecard's linear predictor by
//! full-batch gradient descent on log loss (with an optional L2 ridge
//! penalty).
//!
//! Why gradient descent?
//! - Logistic maximum likelihood has no closed form.
//! - Full-batch descent with zero-initialized weights is deterministic:
//!   identical input files produce bit-identical artifacts.
//! - The design row is tiny (14 columns), so a few thousand iterations are
//!   cheap even for large applicant files.

use nalgebra::{DMatrix, DVector};

use crate::domain::ApplicantRow;
use crate::error::AppError;
use crate::features::{NUM_FEATURES, derive, feature_row};
use crate::math::{log_loss, sigmoid};
use crate::model::{RatingBands, ScoreScale, ScorecardModel};

/// Minimum number of labeled rows beyond the parameter count.
const MIN_N_BUFFER: usize = 5;

/// Options that affect how the scorecard is calibrated.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Gradient descent step size.
    pub learning_rate: f64,
    /// Iteration cap.
    pub max_iter: usize,
    /// Stop when the loss improves by less than this between iterations.
    pub tolerance: f64,
    /// L2 ridge penalty strength (0 disables).
    pub l2: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 2000,
            tolerance: 1e-7,
            l2: 0.0,
        }
    }
}

/// Output of a calibration run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub model: ScorecardModel,
    pub iterations: usize,
    pub final_loss: f64,
    pub converged: bool,
}

/// Fit scorecard weights to labeled applicants.
///
/// Every row must carry a `defaulted` label; the score scale and rating
/// bands are passed through unchanged into the fitted model.
pub fn train(
    rows: &[ApplicantRow],
    scale: ScoreScale,
    bands: RatingBands,
    opts: &TrainOptions,
) -> Result<TrainOutcome, AppError> {
    if !(opts.learning_rate.is_finite() && opts.learning_rate > 0.0) {
        return Err(AppError::invalid_input("Invalid learning rate (must be > 0)."));
    }
    if opts.max_iter == 0 {
        return Err(AppError::invalid_input("Iteration cap must be >= 1."));
    }
    if !(opts.tolerance.is_finite() && opts.tolerance >= 0.0) {
        return Err(AppError::invalid_input("Invalid tolerance (must be >= 0)."));
    }
    if !(opts.l2.is_finite() && opts.l2 >= 0.0) {
        return Err(AppError::invalid_input("Invalid L2 penalty (must be >= 0)."));
    }

    let n = rows.len();
    if n < NUM_FEATURES + MIN_N_BUFFER {
        return Err(AppError::insufficient_data(format!(
            "Underdetermined calibration: n={n} < {} labeled rows.",
            NUM_FEATURES + MIN_N_BUFFER
        )));
    }

    let mut labels = Vec::with_capacity(n);
    let mut design = Vec::with_capacity(n * NUM_FEATURES);
    for row in rows {
        let Some(defaulted) = row.defaulted else {
            return Err(AppError::insufficient_data(format!(
                "Row `{}` is missing the `defaulted` label.",
                row.id
            )));
        };
        labels.push(if defaulted { 1.0 } else { 0.0 });
        let features = derive(&row.record);
        design.extend_from_slice(&feature_row(&row.record, &features));
    }

    let positives = labels.iter().filter(|&&y| y == 1.0).count();
    if positives == 0 || positives == n {
        return Err(AppError::insufficient_data(
            "Calibration needs both defaulted and non-defaulted rows.",
        ));
    }

    let x = DMatrix::from_row_slice(n, NUM_FEATURES, &design);
    let y = DVector::from_row_slice(&labels);
    let n_f = n as f64;

    let mut weights = DVector::<f64>::zeros(NUM_FEATURES);
    let mut intercept = 0.0;
    let mut prev_loss = f64::INFINITY;
    let mut iterations = 0;
    let mut final_loss = f64::INFINITY;
    let mut converged = false;

    for iter in 0..opts.max_iter {
        iterations = iter + 1;

        let linear = &x * &weights;
        let predictions = DVector::from_iterator(
            n,
            linear.iter().map(|&z| sigmoid(z + intercept)),
        );

        let errors = &predictions - &y;
        let mut grad_w = (x.transpose() * &errors) / n_f;
        if opts.l2 > 0.0 {
            grad_w += &weights * opts.l2;
        }
        let grad_b = errors.sum() / n_f;

        weights -= &grad_w * opts.learning_rate;
        intercept -= opts.learning_rate * grad_b;

        final_loss = log_loss(y.as_slice(), predictions.as_slice());
        if (prev_loss - final_loss).abs() < opts.tolerance {
            converged = true;
            break;
        }
        prev_loss = final_loss;
    }

    let model = ScorecardModel::new(weights.as_slice().to_vec(), intercept, scale, bands)?;

    Ok(TrainOutcome {
        model,
        iterations,
        final_loss,
        converged,
    })
}
