//! Regression error metrics for the held-out report.

use serde::{Deserialize, Serialize};

/// Held-out evaluation. Informational only; nothing is gated on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub n: usize,
    pub mae: f64,
    pub rmse: f64,
}

/// Mean absolute error. `None` for empty or mismatched inputs.
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let sum: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    Some(sum / actual.len() as f64)
}

/// Root mean squared error. `None` for empty or mismatched inputs.
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let sse: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    Some((sse / actual.len() as f64).sqrt())
}

pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Option<Evaluation> {
    Some(Evaluation {
        n: actual.len(),
        mae: mean_absolute_error(actual, predicted)?,
        rmse: root_mean_squared_error(actual, predicted)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_has_zero_error() {
        let y = [100.0, 250.5, 80.0];
        assert_eq!(mean_absolute_error(&y, &y), Some(0.0));
        assert_eq!(root_mean_squared_error(&y, &y), Some(0.0));
    }

    #[test]
    fn mae_ignores_error_sign() {
        let actual = [100.0, 100.0];
        assert_eq!(mean_absolute_error(&actual, &[110.0, 90.0]), Some(10.0));
        assert_eq!(mean_absolute_error(&actual, &[90.0, 110.0]), Some(10.0));
    }

    #[test]
    fn rmse_weights_large_errors() {
        let actual = [0.0, 0.0];
        let rmse = root_mean_squared_error(&actual, &[0.0, 10.0]).unwrap();
        assert!((rmse - 50.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_or_mismatched_is_none() {
        assert_eq!(mean_absolute_error(&[], &[]), None);
        assert_eq!(mean_absolute_error(&[1.0], &[1.0, 2.0]), None);
        assert!(evaluate(&[], &[]).is_none());
    }
}
