//! Prediction methods for the Random Forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::tree::DecisionTree;

impl RandomForest {
    /// Predict the response for a single sample.
    ///
    /// Returns the mean of every tree's leaf value.
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

        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict_unchecked(sample))
            .sum();
        Ok(total / self.trees.len() as f64)
    }

    /// Predict responses for a batch of samples in parallel.
    ///
    /// Output order matches input order.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return the individual trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the feature names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

#[cfg(test)]
mod tests {
    use crate::RfError;
    use crate::config::{OobMode, RandomForestConfig};

    #[test]
    fn prediction_is_mean_of_trees() {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 5) as f64]).collect();
        let targets: Vec<f64> = (0..40).map(|i| 2.0 * i as f64).collect();
        let names = vec!["a".to_string(), "b".to_string()];
        let result = RandomForestConfig::new(7)
            .unwrap()
            .with_seed(5)
            .fit(&features, &targets, &names)
            .unwrap();
        let forest = result.forest();
        assert_eq!(forest.n_trees(), 7);
        assert_eq!(forest.n_features(), 2);
        assert_eq!(forest.feature_names(), names.as_slice());

        let sample = [12.5, 3.0];
        let manual: f64 = forest
            .trees()
            .iter()
            .map(|t| t.predict(&sample).unwrap())
            .sum::<f64>()
            / 7.0;
        let pred = forest.predict(&sample).unwrap();
        assert!((pred - manual).abs() < 1e-12);
    }

    #[test]
    fn wrong_feature_count_rejected() {
        let features = vec![vec![1.0, 2.0], vec![2.0, 3.0], vec![3.0, 1.0]];
        let targets = vec![1.0, 2.0, 3.0];
        let names = vec!["a".to_string(), "b".to_string()];
        let result = RandomForestConfig::new(3)
            .unwrap()
            .with_min_samples_split(2)
            .with_oob_mode(OobMode::Disabled)
            .fit(&features, &targets, &names)
            .unwrap();
        let err = result.forest().predict_batch(&[vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            RfError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }
}
