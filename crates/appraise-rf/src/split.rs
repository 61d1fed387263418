use rand::Rng;

use crate::node::FeatureIndex;

/// Strategy for choosing split thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMethod {
    /// Sort each candidate feature and scan every boundary between distinct values.
    Exact,
    /// Draw one uniform random threshold per candidate feature (Extremely Randomized Trees).
    ExtraTrees,
}

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Feature used for the split.
    pub(crate) feature: FeatureIndex,
    /// Threshold value.
    pub(crate) threshold: f64,
    /// Decrease in total sum of squared errors achieved by this split.
    pub(crate) impurity_decrease: f64,
    /// Sample indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Sum-of-squares decrease for a candidate partition.
///
/// `SSE_parent - SSE_left - SSE_right` reduces to
/// `S_l²/n_l + S_r²/n_r - S²/n` where `S` are target sums.
fn sse_decrease(sum_left: f64, n_left: usize, sum_total: f64, n_total: usize) -> f64 {
    let n_right = n_total - n_left;
    let sum_right = sum_total - sum_left;
    sum_left * sum_left / n_left as f64 + sum_right * sum_right / n_right as f64
        - sum_total * sum_total / n_total as f64
}

/// Pick `take` distinct feature indices out of `n_features` with a partial Fisher-Yates shuffle.
fn sample_features(n_features: usize, take: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n_features).collect();
    let take = take.min(n_features);
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        order.swap(i, j);
    }
    order.truncate(take);
    order
}

/// Find the split that most reduces the squared error of the node's targets.
///
/// Considers `max_features` randomly chosen features. Returns `None` when no
/// candidate yields a positive decrease (constant features, or every
/// boundary would violate `min_samples_leaf`).
///
/// `features` is column-major: `features[feature_idx][sample_idx]`, and
/// `sample_indices` index into the inner vectors and into `targets`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    targets: &[f64],
    sample_indices: &[usize],
    method: SplitMethod,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_features = features.len();
    let n_samples = sample_indices.len();

    if n_samples < 2 || n_features == 0 {
        return None;
    }

    let sum_total: f64 = sample_indices.iter().map(|&si| targets[si]).sum();
    let selected = sample_features(n_features, max_features, rng);

    let mut best_decrease = 0.0f64;
    let mut best: Option<(FeatureIndex, f64)> = None;

    for &feat_idx in &selected {
        let feat_col = &features[feat_idx];
        let candidate = match method {
            SplitMethod::Exact => {
                scan_exact(feat_col, targets, sample_indices, sum_total, min_samples_leaf)
            }
            SplitMethod::ExtraTrees => scan_random(
                feat_col,
                targets,
                sample_indices,
                sum_total,
                min_samples_leaf,
                rng,
            ),
        };
        if let Some((threshold, decrease)) = candidate
            && decrease > best_decrease
        {
            best_decrease = decrease;
            best = Some((FeatureIndex::new(feat_idx), threshold));
        }
    }

    let (feature, threshold) = best?;

    let feat_col = &features[feature.index()];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| feat_col[si] <= threshold);

    Some(SplitResult {
        feature,
        threshold,
        impurity_decrease: best_decrease,
        left_indices,
        right_indices,
    })
}

/// Best `(threshold, decrease)` over all boundaries between distinct sorted values.
fn scan_exact(
    feat_col: &[f64],
    targets: &[f64],
    sample_indices: &[usize],
    sum_total: f64,
    min_samples_leaf: usize,
) -> Option<(f64, f64)> {
    let n_samples = sample_indices.len();
    let mut sorted: Vec<(f64, f64)> = sample_indices
        .iter()
        .map(|&si| (feat_col[si], targets[si]))
        .collect();
    sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let mut sum_left = 0.0f64;
    let mut best: Option<(f64, f64)> = None;

    for i in 0..(n_samples - 1) {
        let (val_i, y_i) = sorted[i];
        sum_left += y_i;

        let n_left = i + 1;
        let n_right = n_samples - n_left;

        // No boundary between equal values.
        let val_next = sorted[i + 1].0;
        if val_i == val_next {
            continue;
        }
        if n_left < min_samples_leaf || n_right < min_samples_leaf {
            continue;
        }

        let decrease = sse_decrease(sum_left, n_left, sum_total, n_samples);
        if best.is_none_or(|(_, d)| decrease > d) {
            best = Some(((val_i + val_next) / 2.0, decrease));
        }
    }

    best
}

/// `(threshold, decrease)` for one uniformly drawn threshold in `[min, max)`.
fn scan_random(
    feat_col: &[f64],
    targets: &[f64],
    sample_indices: &[usize],
    sum_total: f64,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<(f64, f64)> {
    let (min, max) = sample_indices
        .iter()
        .map(|&si| feat_col[si])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !(min < max) {
        return None;
    }

    let threshold = rng.gen_range(min..max);

    let mut sum_left = 0.0f64;
    let mut n_left = 0usize;
    for &si in sample_indices {
        if feat_col[si] <= threshold {
            sum_left += targets[si];
            n_left += 1;
        }
    }
    let n_samples = sample_indices.len();
    let n_right = n_samples - n_left;
    if n_left < min_samples_leaf.max(1) || n_right < min_samples_leaf.max(1) {
        return None;
    }

    Some((threshold, sse_decrease(sum_left, n_left, sum_total, n_samples)))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{SplitMethod, find_best_split, sample_features, sse_decrease};

    #[test]
    fn sse_decrease_matches_direct_computation() {
        // targets [1, 1, 5, 5]: parent SSE = 16, children SSE = 0
        let d = sse_decrease(2.0, 2, 12.0, 4);
        assert!((d - 16.0).abs() < 1e-12, "decrease = {d}");
    }

    #[test]
    fn sampled_features_are_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut picked = sample_features(13, 4, &mut rng);
        assert_eq!(picked.len(), 4);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|&f| f < 13));
    }

    #[test]
    fn step_function_finds_correct_split() {
        let features = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let targets = vec![5.0, 5.0, 5.0, 20.0, 20.0, 20.0];
        let sample_indices: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = find_best_split(
            &features,
            &targets,
            &sample_indices,
            SplitMethod::Exact,
            1,
            1,
            &mut rng,
        )
        .expect("should find a split");

        assert_eq!(split.feature.index(), 0);
        assert!((split.threshold - 6.5).abs() < 1e-12);
        assert_eq!(split.left_indices, vec![0, 1, 2]);
        assert_eq!(split.right_indices, vec![3, 4, 5]);
        // parent SSE = 6 * 7.5^2 = 337.5, children are pure
        assert!((split.impurity_decrease - 337.5).abs() < 1e-9);
    }

    #[test]
    fn informative_feature_preferred_over_noise() {
        // Feature 0 is constant, feature 1 separates the targets.
        let features = vec![vec![0.5; 6], vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let targets = vec![1.0, 1.0, 1.0, 9.0, 9.0, 9.0];
        let sample_indices: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let split = find_best_split(
            &features,
            &targets,
            &sample_indices,
            SplitMethod::Exact,
            2,
            1,
            &mut rng,
        )
        .expect("should find a split");
        assert_eq!(split.feature.index(), 1);
    }

    #[test]
    fn constant_feature_returns_none() {
        let features = vec![vec![5.0, 5.0, 5.0, 5.0]];
        let targets = vec![1.0, 2.0, 3.0, 4.0];
        let sample_indices: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for method in [SplitMethod::Exact, SplitMethod::ExtraTrees] {
            let result = find_best_split(
                &features,
                &targets,
                &sample_indices,
                method,
                1,
                1,
                &mut rng,
            );
            assert!(result.is_none(), "{method:?} split a constant feature");
        }
    }

    #[test]
    fn min_samples_leaf_enforced() {
        // 2 samples with min_samples_leaf = 2: each child would hold one sample.
        let features = vec![vec![1.0, 10.0]];
        let targets = vec![0.0, 1.0];
        let sample_indices: Vec<usize> = (0..2).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = find_best_split(
            &features,
            &targets,
            &sample_indices,
            SplitMethod::Exact,
            1,
            2,
            &mut rng,
        );
        assert!(result.is_none());
    }

    #[test]
    fn extra_trees_threshold_within_range() {
        let features = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let targets = vec![5.0, 5.0, 5.0, 20.0, 20.0, 20.0];
        let sample_indices: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let split = find_best_split(
            &features,
            &targets,
            &sample_indices,
            SplitMethod::ExtraTrees,
            1,
            1,
            &mut rng,
        )
        .expect("random threshold inside [1, 12) always separates something");
        assert!(split.threshold >= 1.0 && split.threshold < 12.0);
        assert!(!split.left_indices.is_empty());
        assert!(!split.right_indices.is_empty());
        assert!(split.impurity_decrease > 0.0);
    }
}
