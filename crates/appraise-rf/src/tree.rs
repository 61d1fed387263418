use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    node::{Impurity, Node, NodeIndex},
    split::{SplitMethod, find_best_split},
};

/// Configuration for a single CART regression tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `split_method`      | `Exact`               |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) split_method: SplitMethod,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    ///
    /// All parameters use the defaults shown in the struct-level documentation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            split_method: SplitMethod::Exact,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the split-finding strategy.
    #[must_use]
    pub fn with_split_method(mut self, split_method: SplitMethod) -> Self {
        self.split_method = split_method;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` means grow until all leaves are pure or stopping conditions
    /// are met. `Some(d)` limits depth to `d` levels (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the maximum number of features to consider at each split.
    ///
    /// `None` means consider all features.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the split-finding strategy.
    #[must_use]
    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the minimum samples required in each leaf.
    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    /// Return the maximum features to consider per split, if set.
    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a regression tree on the provided row-major dataset.
    ///
    /// `features[sample_idx][feature_idx]`: row-major layout.
    /// `targets[sample_idx]`: continuous response values.
    ///
    /// # Errors
    ///
    /// | Variant                            | When                                            |
    /// |------------------------------------|-------------------------------------------------|
    /// | [`RfError::EmptyDataset`]          | `features` is empty                             |
    /// | [`RfError::ZeroFeatures`]          | rows have zero feature columns                  |
    /// | [`RfError::LengthMismatch`]        | `targets.len() != features.len()`               |
    /// | [`RfError::FeatureCountMismatch`]  | rows have inconsistent lengths                  |
    /// | [`RfError::NonFiniteValue`]        | any feature value is NaN or infinite            |
    /// | [`RfError::NonFiniteTarget`]       | any target is NaN or infinite                   |
    /// | [`RfError::InvalidMaxFeatures`]    | `max_features` resolves outside [1, n_features] |
    /// | [`RfError::InvalidMaxDepth`]       | `max_depth` is `Some(0)`                        |
    /// | [`RfError::InvalidMinSamplesSplit`]| `min_samples_split` < 2                         |
    /// | [`RfError::InvalidMinSamplesLeaf`] | `min_samples_leaf` < 1                          |
    #[instrument(skip(self, features, targets), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<DecisionTree, RfError> {
        // --- Validate inputs ---
        let n_features = validate_training_data(features, targets)?;

        // --- Validate config ---
        validate_growth_params(self.max_depth, self.min_samples_split, self.min_samples_leaf)?;

        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        debug!(
            n_samples = features.len(),
            n_features, max_features, "fitting decision tree"
        );

        let col_features = to_column_major(features, n_features);
        let sample_indices: Vec<usize> = (0..features.len()).collect();
        let params = GrowParams {
            split_method: self.split_method,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features,
        };

        Ok(grow(
            &col_features,
            targets,
            &sample_indices,
            &params,
            self.seed,
        ))
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a row-major training set and its targets. Returns the feature count.
pub(crate) fn validate_training_data(
    features: &[Vec<f64>],
    targets: &[f64],
) -> Result<usize, RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if targets.len() != features.len() {
        return Err(RfError::LengthMismatch {
            left: features.len(),
            right: targets.len(),
        });
    }

    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(RfError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }

    if let Some(sample_index) = targets.iter().position(|t| !t.is_finite()) {
        return Err(RfError::NonFiniteTarget { sample_index });
    }

    Ok(n_features)
}

/// Check the depth and node-size limits shared by trees and forests.
pub(crate) fn validate_growth_params(
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
) -> Result<(), RfError> {
    if let Some(d) = max_depth
        && d == 0
    {
        return Err(RfError::InvalidMaxDepth { max_depth: 0 });
    }
    if min_samples_split < 2 {
        return Err(RfError::InvalidMinSamplesSplit { min_samples_split });
    }
    if min_samples_leaf < 1 {
        return Err(RfError::InvalidMinSamplesLeaf { min_samples_leaf });
    }
    Ok(())
}

/// Transpose row-major samples into one vector per feature.
pub(crate) fn to_column_major(features: &[Vec<f64>], n_features: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|feat_idx| features.iter().map(|row| row[feat_idx]).collect())
        .collect()
}

/// Already-validated growth parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowParams {
    pub(crate) split_method: SplitMethod,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: usize,
}

/// Grow a tree over `sample_indices` (duplicates allowed, as in a bootstrap draw).
///
/// Inputs must already be validated; this never fails.
pub(crate) fn grow(
    col_features: &[Vec<f64>],
    targets: &[f64],
    sample_indices: &[usize],
    params: &GrowParams,
    seed: u64,
) -> DecisionTree {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut arena: Vec<Node> = Vec::new();

    let root = build_tree(
        col_features,
        targets,
        sample_indices,
        params,
        0,
        &mut rng,
        &mut arena,
    );

    debug!(
        root_index = root.index(),
        n_nodes = arena.len(),
        "decision tree built"
    );

    DecisionTree {
        nodes: arena,
        n_features: col_features.len(),
    }
}

/// Recursively build the arena-based regression tree.
///
/// Returns the [`NodeIndex`] of the node just created in `arena`.
fn build_tree(
    col_features: &[Vec<f64>],
    targets: &[f64],
    sample_indices: &[usize],
    params: &GrowParams,
    depth: usize,
    rng: &mut ChaCha8Rng,
    arena: &mut Vec<Node>,
) -> NodeIndex {
    let n_samples = sample_indices.len();

    let (sum, sum_sq) = sample_indices.iter().fold((0.0f64, 0.0f64), |(s, sq), &si| {
        let y = targets[si];
        (s + y, sq + y * y)
    });
    let impurity = Impurity::from_moments(n_samples, sum, sum_sq);
    let value = if n_samples > 0 {
        sum / n_samples as f64
    } else {
        0.0
    };

    let make_leaf = |arena: &mut Vec<Node>| -> NodeIndex {
        let idx = arena.len();
        arena.push(Node::Leaf {
            value,
            impurity,
            n_samples,
        });
        NodeIndex::new(idx)
    };

    // Stopping conditions -> leaf.
    let depth_exceeded = params.max_depth.is_some_and(|max_d| depth >= max_d);
    let too_few = n_samples < params.min_samples_split;
    let pure = impurity.value() == 0.0;

    if too_few || pure || depth_exceeded {
        return make_leaf(arena);
    }

    let Some(split) = find_best_split(
        col_features,
        targets,
        sample_indices,
        params.split_method,
        params.max_features,
        params.min_samples_leaf,
        rng,
    ) else {
        return make_leaf(arena);
    };

    // Arena pattern: reserve index, recurse, then overwrite with the split.
    let node_idx = arena.len();
    arena.push(Node::Leaf {
        value,
        impurity,
        n_samples,
    });

    let left_idx = build_tree(
        col_features,
        targets,
        &split.left_indices,
        params,
        depth + 1,
        rng,
        arena,
    );

    let right_idx = build_tree(
        col_features,
        targets,
        &split.right_indices,
        params,
        depth + 1,
        rng,
        arena,
    );

    arena[node_idx] = Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: left_idx,
        right: right_idx,
        impurity,
        n_samples,
        impurity_decrease: split.impurity_decrease,
    };

    NodeIndex::new(node_idx)
}

/// A fitted CART regression tree.
///
/// Stored as an arena-based `Vec<Node>` with index references for
/// cache-friendly traversal.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Predict the response for a single sample.
    ///
    /// Traverses from the root (index 0): at each `Split`, goes left when
    /// `sample[feature] <= threshold`, right otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<f64, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.predict_unchecked(sample))
    }

    /// Leaf value for a sample whose length is already known to match.
    pub(crate) fn predict_unchecked(&self, sample: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    /// Compute Mean Decrease in Impurity (MDI) feature importances.
    ///
    /// For each `Split` node, the `impurity_decrease` is accumulated by
    /// feature index, then the totals are normalized so they sum to 1.0.
    /// Returns a `Vec` of length `n_features`; all zeros when the tree is
    /// a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Return the nodes of the tree in arena order (root first).
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    queue.push_back((left.index(), d + 1));
                    queue.push_back((right.index(), d + 1));
                }
            }
        }

        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        let targets = vec![5.0, 5.0, 5.0, 20.0, 20.0, 20.0];
        (features, targets)
    }

    #[test]
    fn empty_dataset_error() {
        let features: Vec<Vec<f64>> = vec![];
        let targets: Vec<f64> = vec![];
        let err = DecisionTreeConfig::new().fit(&features, &targets).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn constant_target_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let targets = vec![7.5, 7.5, 7.5];
        let tree = DecisionTreeConfig::new().fit(&features, &targets).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.depth(), 0);
        assert!((tree.predict(&[2.0, 3.0]).unwrap() - 7.5).abs() < 1e-12);
    }

    #[test]
    fn step_function_recovered() {
        let (features, targets) = step_data();
        let tree = DecisionTreeConfig::new()
            .with_seed(42)
            .fit(&features, &targets)
            .unwrap();
        assert!((tree.predict(&[2.0, 0.0]).unwrap() - 5.0).abs() < 1e-12);
        assert!((tree.predict(&[11.0, 0.0]).unwrap() - 20.0).abs() < 1e-12);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn leaf_value_is_mean_of_samples() {
        // min_samples_split larger than the dataset forces a root leaf.
        let features = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let targets = vec![1.0, 2.0, 3.0, 6.0];
        let tree = DecisionTreeConfig::new()
            .with_min_samples_split(10)
            .fit(&features, &targets)
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert!((tree.predict(&[100.0]).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn interaction_needs_depth_at_least_2() {
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let targets = vec![0.0, 1.0, 2.0, 4.0, 0.0, 1.0, 2.0, 4.0];
        let tree = DecisionTreeConfig::new()
            .with_seed(42)
            .fit(&features, &targets)
            .unwrap();
        assert!(tree.depth() >= 2);
        assert!((tree.predict(&[1.0, 1.0]).unwrap() - 4.0).abs() < 1e-12);
        assert!((tree.predict(&[0.0, 0.0]).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn feature_importances_sum_to_one() {
        let features = vec![
            vec![1.0, 100.0],
            vec![2.0, 200.0],
            vec![3.0, 300.0],
            vec![10.0, 100.0],
            vec![11.0, 200.0],
            vec![12.0, 300.0],
        ];
        let targets = vec![1.0, 1.5, 1.2, 8.0, 8.3, 7.9];
        let tree = DecisionTreeConfig::new().fit(&features, &targets).unwrap();
        let importances = tree.feature_importances();
        let sum: f64 = importances.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10, "sum = {sum}");
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let features: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![i as f64, (i * 7 % 11) as f64, (i * 3 % 5) as f64])
            .collect();
        let targets: Vec<f64> = (0..30).map(|i| (i as f64).sin() * 10.0).collect();
        let config = DecisionTreeConfig::new()
            .with_max_features(Some(1))
            .with_seed(123);
        let tree1 = config.fit(&features, &targets).unwrap();
        let tree2 = config.fit(&features, &targets).unwrap();
        for sample in &features {
            assert_eq!(
                tree1.predict(sample).unwrap(),
                tree2.predict(sample).unwrap()
            );
        }
    }

    #[test]
    fn prediction_feature_mismatch() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let targets = vec![0.0, 1.0];
        let tree = DecisionTreeConfig::new().fit(&features, &targets).unwrap();
        let err = tree.predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            RfError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn max_depth_limits_tree() {
        let features: Vec<Vec<f64>> = (0..16).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..16).map(|i| i as f64).collect();
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &targets)
            .unwrap();
        assert!(tree.depth() <= 1);
        assert!(tree.n_leaves() <= 2);
    }

    #[test]
    fn min_samples_leaf_respected() {
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..20).map(|i| (i * i) as f64).collect();
        let tree = DecisionTreeConfig::new()
            .with_min_samples_leaf(4)
            .fit(&features, &targets)
            .unwrap();
        for node in tree.nodes() {
            if node.is_leaf() {
                assert!(node.n_samples() >= 4, "leaf with {} samples", node.n_samples());
            }
        }
    }

    #[test]
    fn feature_count_mismatch_error() {
        let features = vec![vec![1.0, 2.0], vec![3.0]];
        let targets = vec![0.0, 1.0];
        let err = DecisionTreeConfig::new().fit(&features, &targets).unwrap_err();
        assert!(matches!(err, RfError::FeatureCountMismatch { .. }));
    }

    #[test]
    fn non_finite_value_error() {
        let features = vec![vec![1.0, f64::NAN], vec![3.0, 4.0]];
        let targets = vec![0.0, 1.0];
        let err = DecisionTreeConfig::new().fit(&features, &targets).unwrap_err();
        assert!(matches!(err, RfError::NonFiniteValue { .. }));
    }

    #[test]
    fn non_finite_target_error() {
        let features = vec![vec![1.0], vec![3.0]];
        let targets = vec![0.0, f64::INFINITY];
        let err = DecisionTreeConfig::new().fit(&features, &targets).unwrap_err();
        assert!(matches!(err, RfError::NonFiniteTarget { sample_index: 1 }));
    }

    #[test]
    fn target_length_mismatch_error() {
        let features = vec![vec![1.0], vec![3.0]];
        let targets = vec![0.0];
        let err = DecisionTreeConfig::new().fit(&features, &targets).unwrap_err();
        assert!(matches!(err, RfError::LengthMismatch { left: 2, right: 1 }));
    }

    #[test]
    fn invalid_growth_params_rejected() {
        let (features, targets) = step_data();
        let err = DecisionTreeConfig::new()
            .with_max_depth(Some(0))
            .fit(&features, &targets)
            .unwrap_err();
        assert!(matches!(err, RfError::InvalidMaxDepth { .. }));

        let err = DecisionTreeConfig::new()
            .with_min_samples_split(1)
            .fit(&features, &targets)
            .unwrap_err();
        assert!(matches!(err, RfError::InvalidMinSamplesSplit { .. }));

        let err = DecisionTreeConfig::new()
            .with_min_samples_leaf(0)
            .fit(&features, &targets)
            .unwrap_err();
        assert!(matches!(err, RfError::InvalidMinSamplesLeaf { .. }));

        let err = DecisionTreeConfig::new()
            .with_max_features(Some(3))
            .fit(&features, &targets)
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::InvalidMaxFeatures {
                max_features: 3,
                n_features: 2
            }
        ));
    }

    #[test]
    fn extra_trees_step_function() {
        let (features, targets) = step_data();
        let tree = DecisionTreeConfig::new()
            .with_split_method(SplitMethod::ExtraTrees)
            .with_seed(42)
            .fit(&features, &targets)
            .unwrap();
        assert!((tree.predict(&[1.0, 0.0]).unwrap() - 5.0).abs() < 1e-12);
        assert!((tree.predict(&[12.0, 0.0]).unwrap() - 20.0).abs() < 1e-12);
    }
}
