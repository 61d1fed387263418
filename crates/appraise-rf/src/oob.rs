//! Out-of-bag (OOB) evaluation for Random Forest regression.

use crate::error::RfError;
use crate::tree::DecisionTree;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone)]
pub struct OobScore {
    /// Mean squared error of the OOB predictions.
    pub mse: f64,
    /// Fraction of target variance explained by the OOB predictions.
    ///
    /// `NaN` when the evaluated targets have zero variance.
    pub r_squared: f64,
    /// Number of samples that had at least one OOB tree.
    pub n_oob_samples: usize,
}

/// Compute out-of-bag predictions, MSE and R².
///
/// Each sample is predicted by averaging only the trees whose bootstrap did
/// not draw it. Samples with no OOB tree are skipped.
pub(crate) fn compute_oob(
    trees: &[DecisionTree],
    features: &[Vec<f64>],
    targets: &[f64],
    oob_indices_per_tree: &[Vec<usize>],
) -> Result<OobScore, RfError> {
    let n_samples = features.len();

    let mut oob_sums = vec![0.0f64; n_samples];
    let mut oob_counts = vec![0usize; n_samples];

    for (tree, oob_indices) in trees.iter().zip(oob_indices_per_tree) {
        for &sample_idx in oob_indices {
            oob_sums[sample_idx] += tree.predict(&features[sample_idx])?;
            oob_counts[sample_idx] += 1;
        }
    }

    let evaluated: Vec<(f64, f64)> = (0..n_samples)
        .filter(|&i| oob_counts[i] > 0)
        .map(|i| (targets[i], oob_sums[i] / oob_counts[i] as f64))
        .collect();

    let n_oob_samples = evaluated.len();
    if n_oob_samples == 0 {
        return Err(RfError::OobEvaluationFailed {
            reason: "no sample has any OOB tree".to_string(),
        });
    }

    let n = n_oob_samples as f64;
    let mse = evaluated.iter().map(|(y, p)| (y - p) * (y - p)).sum::<f64>() / n;
    let mean = evaluated.iter().map(|(y, _)| y).sum::<f64>() / n;
    let variance = evaluated
        .iter()
        .map(|(y, _)| (y - mean) * (y - mean))
        .sum::<f64>()
        / n;
    let r_squared = if variance > 0.0 {
        1.0 - mse / variance
    } else {
        f64::NAN
    };

    Ok(OobScore {
        mse,
        r_squared,
        n_oob_samples,
    })
}
