//! Stable logistic primitives.
//!
//! The scorecard's probability output is `sigmoid(x)` for a linear predictor
//! `x`, and calibration minimizes the binary cross-entropy (log loss).
//!
//! Numerical notes:
//! - `1 / (1 + exp(-x))` overflows `exp` for large negative `x`. We branch on
//!   the sign and evaluate the algebraically equivalent form whose `exp`
//!   argument is always non-positive.
//! - Log loss clips predictions away from 0 and 1 so the logarithms stay
//!   finite for saturated predictions.

/// Clip applied to predicted probabilities inside the log loss.
const LOSS_EPS: f64 = 1e-15;

/// Compute `sigmoid(x) = 1 / (1 + exp(-x))` in a numerically stable way.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Mean binary cross-entropy of predictions `p` against labels `y` (0 or 1).
///
/// # Panics
/// Panics if the slices have different lengths or are empty. Callers own the
/// shape of the training set.
pub fn log_loss(y: &[f64], p: &[f64]) -> f64 {
    assert_eq!(y.len(), p.len(), "label/prediction length mismatch");
    assert!(!y.is_empty(), "log loss of an empty set");

    let n = y.len() as f64;
    -y.iter()
        .zip(p.iter())
        .map(|(&yi, &pi)| {
            let pc = pi.clamp(LOSS_EPS, 1.0 - LOSS_EPS);
            yi * pc.ln() + (1.0 - yi) * (1.0 - pc).ln()
        })
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_midpoint_and_tails() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);
    }

    #[test]
    fn sigmoid_stays_in_unit_interval_for_extreme_inputs() {
        for &x in &[-1e6, -750.0, -1.0, 0.0, 1.0, 750.0, 1e6] {
            let p = sigmoid(x);
            assert!(p.is_finite(), "sigmoid({x}) not finite");
            assert!((0.0..=1.0).contains(&p), "sigmoid({x}) = {p} out of range");
        }
    }

    #[test]
    fn sigmoid_is_monotone() {
        let xs: Vec<f64> = (-50..=50).map(|i| i as f64 / 5.0).collect();
        for w in xs.windows(2) {
            assert!(sigmoid(w[0]) < sigmoid(w[1]));
        }
    }

    #[test]
    fn log_loss_is_finite_on_saturated_predictions() {
        let y = [1.0, 0.0];
        let p = [1.0, 0.0];
        let loss = log_loss(&y, &p);
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }

    #[test]
    fn log_loss_prefers_correct_predictions() {
        let y = [1.0, 0.0, 1.0];
        let good = [0.9, 0.1, 0.8];
        let bad = [0.4, 0.6, 0.3];
        assert!(log_loss(&y, &good) < log_loss(&y, &bad));
    }
}
