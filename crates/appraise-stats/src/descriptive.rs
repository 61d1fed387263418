//! Single-column summaries.

use crate::StatsError;

/// Summary of the finite values of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Number of finite values summarized.
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Median, averaging the two middle values for even counts.
    pub median: f64,
    /// Sample standard deviation (`n - 1` denominator); `0.0` for one value.
    pub std_dev: f64,
}

impl Summary {
    /// Summarize the finite values in `values`.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::EmptyInput`] if no value is finite.
    pub fn from_values(values: &[f64]) -> Result<Self, StatsError> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Err(StatsError::EmptyInput);
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };
        let std_dev = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            median,
            std_dev,
        })
    }
}
