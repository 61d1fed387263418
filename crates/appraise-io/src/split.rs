//! Seeded train/test split stratified on target quantiles.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Row indices of a train/test partition, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl TrainTestSplit {
    /// Return the training row indices.
    #[must_use]
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Return the held-out row indices.
    #[must_use]
    pub fn test(&self) -> &[usize] {
        &self.test
    }
}

/// Configuration for a stratified train/test split.
///
/// Rows are binned by the quantiles of the target, and each bin contributes
/// its share of test rows, so both partitions follow the target's
/// distribution.
///
/// # Defaults
///
/// | Parameter  | Default |
/// |------------|---------|
/// | `n_strata` | 4       |
/// | `seed`     | 123     |
#[derive(Debug, Clone)]
pub struct StratifiedSplit {
    train_fraction: f64,
    n_strata: usize,
    seed: u64,
}

impl StratifiedSplit {
    /// Create a split keeping `train_fraction` of the rows for training.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidTrainFraction`] unless `0 < train_fraction < 1`.
    pub fn new(train_fraction: f64) -> Result<Self, IoError> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(IoError::InvalidTrainFraction {
                fraction: train_fraction,
            });
        }
        Ok(Self {
            train_fraction,
            n_strata: 4,
            seed: 123,
        })
    }

    /// Set the number of quantile bins.
    #[must_use]
    pub fn with_n_strata(mut self, n_strata: usize) -> Self {
        self.n_strata = n_strata;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the training fraction.
    #[must_use]
    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    /// Return the number of quantile bins.
    #[must_use]
    pub fn n_strata(&self) -> usize {
        self.n_strata
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Partition row indices `0..targets.len()` into train and test sets.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::InvalidStrataCount`] | `n_strata` is zero |
    /// | [`IoError::EmptyTarget`] | `targets` is empty |
    /// | [`IoError::NonFiniteTarget`] | a target is NaN or infinite |
    /// | [`IoError::EmptyPartition`] | the fraction leaves one side with no rows |
    #[instrument(skip_all, fields(n_rows = targets.len(), seed = self.seed))]
    pub fn split(&self, targets: &[f64]) -> Result<TrainTestSplit, IoError> {
        // --- Validate inputs ---
        if self.n_strata == 0 {
            return Err(IoError::InvalidStrataCount { n_strata: 0 });
        }
        if targets.is_empty() {
            return Err(IoError::EmptyTarget);
        }
        if let Some(row_index) = targets.iter().position(|t| !t.is_finite()) {
            return Err(IoError::NonFiniteTarget { row_index });
        }

        let n = targets.len();
        let test_fraction = 1.0 - self.train_fraction;
        let n_test = (n as f64 * test_fraction).round() as usize;
        if n_test == 0 || n_test == n {
            return Err(IoError::EmptyPartition {
                n_train: n - n_test,
                n_test,
            });
        }

        // --- Bin rows by target quantile ---
        let breaks = quantile_breaks(targets, self.n_strata);
        let inner = if breaks.len() > 2 {
            &breaks[1..breaks.len() - 1]
        } else {
            &[][..]
        };
        let mut strata: Vec<Vec<usize>> = vec![Vec::new(); inner.len() + 1];
        for (i, &y) in targets.iter().enumerate() {
            let stratum = inner.iter().filter(|&&b| y > b).count();
            strata[stratum].push(i);
        }

        let quotas = apportion(&strata, test_fraction, n_test);
        debug!(
            strata = ?strata.iter().map(Vec::len).collect::<Vec<_>>(),
            quotas = ?quotas,
            "stratum test quotas"
        );

        // --- Draw test rows ---
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut test = Vec::with_capacity(n_test);
        for (members, &quota) in strata.iter_mut().zip(&quotas) {
            members.shuffle(&mut rng);
            test.extend_from_slice(&members[..quota]);
        }
        test.sort_unstable();

        let mut in_test = vec![false; n];
        for &i in &test {
            in_test[i] = true;
        }
        let train: Vec<usize> = (0..n).filter(|&i| !in_test[i]).collect();

        info!(
            n_train = train.len(),
            n_test = test.len(),
            n_strata = strata.len(),
            "stratified split complete"
        );

        Ok(TrainTestSplit { train, test })
    }
}

/// Quantile breaks at probabilities `k / n_strata` for `k = 0..=n_strata`.
///
/// Linear interpolation between order statistics (`h = (n - 1) p`).
/// Equal consecutive breaks are collapsed.
pub(crate) fn quantile_breaks(values: &[f64], n_strata: usize) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let n = sorted.len();

    let mut breaks: Vec<f64> = Vec::with_capacity(n_strata + 1);
    for k in 0..=n_strata {
        let h = (n - 1) as f64 * (k as f64 / n_strata as f64);
        let lo = h.floor() as usize;
        let hi = (lo + 1).min(n - 1);
        let v = sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]);
        if breaks.last() != Some(&v) {
            breaks.push(v);
        }
    }
    breaks
}

/// Largest-remainder apportionment of `total` test rows across strata.
///
/// Each stratum gets the floor of its exact share; leftover rows go to the
/// largest fractional parts, ties to the lower stratum.
fn apportion(strata: &[Vec<usize>], test_fraction: f64, total: usize) -> Vec<usize> {
    let exact: Vec<f64> = strata
        .iter()
        .map(|s| s.len() as f64 * test_fraction)
        .collect();
    let mut quotas: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let assigned: usize = quotas.iter().sum();
    let mut order: Vec<usize> = (0..strata.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - quotas[a] as f64;
        let fb = exact[b] - quotas[b] as f64;
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    for &g in order.iter().take(total.saturating_sub(assigned)) {
        quotas[g] += 1;
    }

    // A stratum never yields more rows than it has.
    for (q, s) in quotas.iter_mut().zip(strata) {
        *q = (*q).min(s.len());
    }
    quotas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_breaks_interpolate() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_breaks(&values, 4), vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        let values = [10.0, 0.0, 20.0, 30.0];
        // h = 3p: 0, 0.75, 1.5, 2.25, 3
        assert_eq!(
            quantile_breaks(&values, 4),
            vec![0.0, 7.5, 15.0, 22.5, 30.0]
        );
    }

    #[test]
    fn quantile_breaks_collapse_duplicates() {
        let values = [1.0, 1.0, 1.0, 1.0, 9.0];
        assert_eq!(quantile_breaks(&values, 4), vec![1.0, 9.0]);
    }

    #[test]
    fn apportion_largest_remainder() {
        let strata = vec![vec![0; 127], vec![0; 129], vec![0; 126], vec![0; 124]];
        let quotas = apportion(&strata, 0.2, 101);
        assert_eq!(quotas, vec![25, 26, 25, 25]);
    }

    #[test]
    fn invalid_fraction_rejected() {
        for fraction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                StratifiedSplit::new(fraction),
                Err(IoError::InvalidTrainFraction { .. })
            ));
        }
    }

    #[test]
    fn zero_strata_rejected() {
        let err = StratifiedSplit::new(0.8)
            .unwrap()
            .with_n_strata(0)
            .split(&[1.0, 2.0])
            .unwrap_err();
        assert!(matches!(err, IoError::InvalidStrataCount { n_strata: 0 }));
    }

    #[test]
    fn empty_target_rejected() {
        let err = StratifiedSplit::new(0.8).unwrap().split(&[]).unwrap_err();
        assert!(matches!(err, IoError::EmptyTarget));
    }

    #[test]
    fn empty_partition_rejected() {
        // round(2 * 0.1) = 0 test rows.
        let err = StratifiedSplit::new(0.9)
            .unwrap()
            .split(&[1.0, 2.0])
            .unwrap_err();
        assert!(matches!(err, IoError::EmptyPartition { n_test: 0, .. }));
    }

    #[test]
    fn partition_is_disjoint_and_complete() {
        let targets: Vec<f64> = (0..97).map(|i| ((i * 37) % 101) as f64).collect();
        let split = StratifiedSplit::new(0.75)
            .unwrap()
            .with_seed(9)
            .split(&targets)
            .unwrap();

        assert_eq!(split.test().len(), 24);
        assert_eq!(split.train().len() + split.test().len(), 97);
        let mut all: Vec<usize> = split.train().iter().chain(split.test()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..97).collect::<Vec<_>>());
        assert!(split.train().windows(2).all(|w| w[0] < w[1]));
        assert!(split.test().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn same_seed_same_split() {
        let targets: Vec<f64> = (0..200).map(|i| (i as f64 * 0.7).sin()).collect();
        let a = StratifiedSplit::new(0.8).unwrap().with_seed(5).split(&targets).unwrap();
        let b = StratifiedSplit::new(0.8).unwrap().with_seed(5).split(&targets).unwrap();
        let c = StratifiedSplit::new(0.8).unwrap().with_seed(6).split(&targets).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.test(), c.test());
    }

    #[test]
    fn strata_are_balanced() {
        // Four well-separated target bands of 50 rows each.
        let targets: Vec<f64> = (0..200).map(|i| (i / 50) as f64 * 100.0 + (i % 50) as f64).collect();
        let split = StratifiedSplit::new(0.8).unwrap().split(&targets).unwrap();
        for band in 0..4 {
            let in_band = split
                .test()
                .iter()
                .filter(|&&i| i / 50 == band)
                .count();
            assert_eq!(in_band, 10, "band {band}");
        }
    }

    #[test]
    fn constant_target_uses_single_stratum() {
        let targets = vec![3.0; 10];
        let split = StratifiedSplit::new(0.8).unwrap().split(&targets).unwrap();
        assert_eq!(split.test().len(), 2);
        assert_eq!(split.train().len(), 8);
    }
}
