//! Pearson correlation over pairwise-complete observations.

use tracing::{debug, instrument};

use crate::StatsError;

/// Pearson correlation coefficient of `x` and `y`.
///
/// Pairs where either value is non-finite are skipped. Returns `NaN` when
/// fewer than two complete pairs remain or when either side has zero
/// variance over the complete pairs. The result is clamped to `[-1, 1]`.
///
/// # Errors
///
/// Returns [`StatsError::LengthMismatch`] if the slices differ in length.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    Ok(pearson_complete(x, y))
}

fn pearson_complete(x: &[f64], y: &[f64]) -> f64 {
    let pairs = || {
        x.iter()
            .zip(y)
            .filter(|(a, b)| a.is_finite() && b.is_finite())
    };

    let mut n = 0usize;
    let (mut sum_x, mut sum_y) = (0.0, 0.0);
    for (a, b) in pairs() {
        n += 1;
        sum_x += a;
        sum_y += b;
    }
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = sum_x / n as f64;
    let mean_y = sum_y / n as f64;

    // Centered second pass.
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in pairs() {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Symmetric matrix of Pearson coefficients between named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlate every pair of `columns`.
    ///
    /// The diagonal is always `1.0`. A column with zero variance yields `NaN`
    /// against every other column.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`StatsError::EmptyInput`] | no columns |
    /// | [`StatsError::NameCountMismatch`] | `names.len() != columns.len()` |
    /// | [`StatsError::LengthMismatch`] | columns differ in length |
    #[instrument(skip_all, fields(n_columns = columns.len()))]
    pub fn from_columns(names: &[String], columns: &[Vec<f64>]) -> Result<Self, StatsError> {
        // --- Validate inputs ---
        if columns.is_empty() {
            return Err(StatsError::EmptyInput);
        }
        if names.len() != columns.len() {
            return Err(StatsError::NameCountMismatch {
                names: names.len(),
                columns: columns.len(),
            });
        }
        let n_rows = columns[0].len();
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(StatsError::LengthMismatch {
                left: n_rows,
                right: bad.len(),
            });
        }

        let k = columns.len();
        let mut values = vec![vec![1.0; k]; k];
        for i in 0..k {
            for j in (i + 1)..k {
                let r = pearson_complete(&columns[i], &columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        debug!(n_rows, "correlation matrix computed");

        Ok(Self {
            names: names.to_vec(),
            values,
        })
    }

    /// Column names, in matrix order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Matrix rows.
    #[must_use]
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Number of columns (the matrix is `len() x len()`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed matrix.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Coefficient at row `i`, column `j`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Coefficient between two columns by name.
    #[must_use]
    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        self.get(i, j)
    }

    /// Correlations of every other column against `name`, strongest first.
    ///
    /// Ordered by absolute value; `NaN` entries sort last.
    #[must_use]
    pub fn ranked_against(&self, name: &str) -> Vec<(&str, f64)> {
        let Some(row) = self.names.iter().position(|n| n == name) else {
            return Vec::new();
        };
        let mut ranked: Vec<(&str, f64)> = self
            .names
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != row)
            .map(|(j, n)| (n.as_str(), self.values[row][j]))
            .collect();
        ranked.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (false, false) => b.1.abs().total_cmp(&a.1.abs()),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });
        ranked
    }
}
