//! Ordinary least-squares trend line.

use crate::StatsError;

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Least-squares fit of `y` on `x`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`StatsError::LengthMismatch`] | `x.len() != y.len()` |
    /// | [`StatsError::EmptyInput`] | fewer than two points |
    /// | [`StatsError::NonFiniteValue`] | a coordinate is NaN or infinite |
    /// | [`StatsError::DegenerateTrend`] | every `x` is equal |
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self, StatsError> {
        // --- Validate inputs ---
        if x.len() != y.len() {
            return Err(StatsError::LengthMismatch {
                left: x.len(),
                right: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(StatsError::EmptyInput);
        }
        if let Some(index) = x
            .iter()
            .zip(y)
            .position(|(a, b)| !a.is_finite() || !b.is_finite())
        {
            return Err(StatsError::NonFiniteValue { index });
        }

        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;
        let (sxy, sxx) = x.iter().zip(y).fold((0.0, 0.0), |(sxy, sxx), (a, b)| {
            let dx = a - mean_x;
            (sxy + dx * (b - mean_y), sxx + dx * dx)
        });
        if sxx == 0.0 {
            return Err(StatsError::DegenerateTrend);
        }

        let slope = sxy / sxx;
        Ok(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    /// Evaluate the line at `x`.
    #[must_use]
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}
