//! Hold-out regression metrics.

use crate::error::RfError;

/// RMSE, MAE and R² of a set of predictions against actual values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Coefficient of determination, `1 - SS_res / SS_tot`.
    pub r_squared: f64,
    /// Number of (actual, predicted) pairs evaluated.
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Compute metrics from paired actual and predicted values.
    ///
    /// # Errors
    ///
    /// | Variant                     | When                                   |
    /// |-----------------------------|----------------------------------------|
    /// | [`RfError::EmptyDataset`]   | `actual` is empty                      |
    /// | [`RfError::LengthMismatch`] | `actual.len() != predicted.len()`      |
    /// | [`RfError::ConstantTarget`] | `actual` has zero variance             |
    pub fn from_predictions(actual: &[f64], predicted: &[f64]) -> Result<Self, RfError> {
        if actual.len() != predicted.len() {
            return Err(RfError::LengthMismatch {
                left: actual.len(),
                right: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Err(RfError::EmptyDataset);
        }

        let n = actual.len() as f64;
        let mean = actual.iter().sum::<f64>() / n;

        let mut ss_res = 0.0f64;
        let mut abs_sum = 0.0f64;
        let mut ss_tot = 0.0f64;
        for (&y, &p) in actual.iter().zip(predicted) {
            let err = y - p;
            ss_res += err * err;
            abs_sum += err.abs();
            ss_tot += (y - mean) * (y - mean);
        }

        if ss_tot == 0.0 {
            return Err(RfError::ConstantTarget);
        }

        Ok(Self {
            rmse: (ss_res / n).sqrt(),
            mae: abs_sum / n,
            r_squared: 1.0 - ss_res / ss_tot,
            n_samples: actual.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_predictions() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let m = RegressionMetrics::from_predictions(&actual, &actual).unwrap();
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r_squared, 1.0);
        assert_eq!(m.n_samples, 4);
    }

    #[test]
    fn known_values() {
        let actual = [3.0, -0.5, 2.0, 7.0];
        let predicted = [2.5, 0.0, 2.0, 8.0];
        let m = RegressionMetrics::from_predictions(&actual, &predicted).unwrap();
        // errors 0.5, -0.5, 0, -1 -> SSE 1.5, MAE 0.5
        assert!((m.rmse - (1.5f64 / 4.0).sqrt()).abs() < 1e-12);
        assert!((m.mae - 0.5).abs() < 1e-12);
        // mean 2.875, SS_tot 29.1875
        assert!((m.r_squared - (1.0 - 1.5 / 29.1875)).abs() < 1e-12);
    }

    #[test]
    fn rmse_at_least_mae() {
        let actual = [10.0, 12.0, 9.5, 30.0, 22.1, 15.0];
        let predicted = [11.0, 10.0, 9.0, 25.0, 23.0, 15.5];
        let m = RegressionMetrics::from_predictions(&actual, &predicted).unwrap();
        assert!(m.rmse >= m.mae);
        assert!(m.mae >= 0.0);
        assert!(m.r_squared <= 1.0);
    }

    #[test]
    fn mean_prediction_gives_zero_r_squared() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [2.0, 2.0, 2.0];
        let m = RegressionMetrics::from_predictions(&actual, &predicted).unwrap();
        assert!(m.r_squared.abs() < 1e-12);
    }

    #[test]
    fn empty_input_error() {
        let err = RegressionMetrics::from_predictions(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn length_mismatch_error() {
        let err = RegressionMetrics::from_predictions(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, RfError::LengthMismatch { left: 2, right: 1 }));
    }

    #[test]
    fn constant_actual_error() {
        let err = RegressionMetrics::from_predictions(&[4.0, 4.0], &[3.0, 5.0]).unwrap_err();
        assert!(matches!(err, RfError::ConstantTarget));
    }
}
