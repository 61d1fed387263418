//! Permutation-based feature importance (%IncMSE).

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::forest::RandomForest;
use crate::tree::DecisionTree;

/// Permutation importance result for a single feature.
#[derive(Debug, Clone)]
pub struct PermutationImportance {
    /// Feature name.
    pub name: String,
    /// Mean increase in OOB mean squared error when this feature is permuted.
    pub importance: f64,
    /// Standard deviation of the increase across trees.
    pub std: f64,
    /// Mean divided by its standard error (`std / sqrt(n_trees)`); 0 when `std` is 0.
    pub scaled: f64,
    /// Rank (1 = most important).
    pub rank: usize,
}

/// Mean squared error of a single tree on its OOB samples.
fn tree_oob_mse(
    tree: &DecisionTree,
    features: &[Vec<f64>],
    targets: &[f64],
    oob_indices: &[usize],
) -> f64 {
    let sse: f64 = oob_indices
        .iter()
        .map(|&idx| {
            let err = tree.predict_unchecked(&features[idx]) - targets[idx];
            err * err
        })
        .sum();
    sse / oob_indices.len() as f64
}

/// OOB mean squared error of a single tree with one feature column shuffled.
fn tree_permuted_mse(
    tree: &DecisionTree,
    features: &[Vec<f64>],
    targets: &[f64],
    oob_indices: &[usize],
    feature_idx: usize,
    rng: &mut ChaCha8Rng,
) -> f64 {
    let mut permuted_values: Vec<f64> = oob_indices
        .iter()
        .map(|&idx| features[idx][feature_idx])
        .collect();
    permuted_values.shuffle(rng);

    let mut sample = Vec::with_capacity(features.first().map_or(0, Vec::len));
    let sse: f64 = oob_indices
        .iter()
        .zip(&permuted_values)
        .map(|(&idx, &permuted_val)| {
            sample.clear();
            sample.extend_from_slice(&features[idx]);
            sample[feature_idx] = permuted_val;
            let err = tree.predict_unchecked(&sample) - targets[idx];
            err * err
        })
        .sum();
    sse / oob_indices.len() as f64
}

/// Compute permutation feature importance using per-tree OOB samples.
///
/// For each tree with a non-empty OOB set and each feature:
/// 1. Compute the tree's baseline OOB MSE
/// 2. Shuffle the feature column among the OOB samples
/// 3. Importance = permuted MSE - baseline MSE
///
/// The final importance per feature is the mean across trees, with the
/// population standard deviation (ddof=0) across the same trees. Inputs are
/// assumed to match the training data.
pub(crate) fn compute_permutation_importance(
    forest: &RandomForest,
    features: &[Vec<f64>],
    targets: &[f64],
    oob_indices_per_tree: &[Vec<usize>],
    feature_names: &[String],
    seed: u64,
) -> Vec<PermutationImportance> {
    let n_features = feature_names.len();

    // Each (tree, feature) pair has its own seed, so parallel order is irrelevant.
    let increases: Vec<Vec<f64>> = forest
        .trees
        .par_iter()
        .zip(oob_indices_per_tree.par_iter())
        .enumerate()
        .filter(|(_, (_, oob_indices))| !oob_indices.is_empty())
        .map(|(tree_idx, (tree, oob_indices))| {
            let baseline = tree_oob_mse(tree, features, targets, oob_indices);
            (0..n_features)
                .map(|feat_idx| {
                    let rng_seed = seed
                        .wrapping_add((tree_idx as u64).wrapping_mul(n_features as u64))
                        .wrapping_add(feat_idx as u64);
                    let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
                    tree_permuted_mse(tree, features, targets, oob_indices, feat_idx, &mut rng)
                        - baseline
                })
                .collect()
        })
        .collect();

    if increases.is_empty() {
        return feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| PermutationImportance {
                name: name.clone(),
                importance: 0.0,
                std: 0.0,
                scaled: 0.0,
                rank: i + 1,
            })
            .collect();
    }

    let n_valid_trees = increases.len() as f64;

    let mut results: Vec<PermutationImportance> = (0..n_features)
        .map(|feat_idx| {
            let values: Vec<f64> = increases.iter().map(|tree| tree[feat_idx]).collect();

            let mean = values.iter().sum::<f64>() / n_valid_trees;
            let variance =
                values.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n_valid_trees;
            let std = variance.sqrt();
            let scaled = if std > 0.0 {
                mean / (std / n_valid_trees.sqrt())
            } else {
                0.0
            };

            PermutationImportance {
                name: feature_names[feat_idx].clone(),
                importance: mean,
                std,
                scaled,
                rank: 0,
            }
        })
        .collect();

    results.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, result) in results.iter_mut().enumerate() {
        result.rank = i + 1;
    }

    results
}
