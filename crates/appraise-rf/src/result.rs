//! Training result types for Random Forest.

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::importance::RankedFeature;
use crate::oob::OobScore;
use crate::perm_importance::{PermutationImportance, compute_permutation_importance};

/// Metadata about the training run.
#[derive(Debug, Clone)]
pub struct TrainingMetadata {
    /// Number of trees trained.
    pub n_trees: usize,
    /// Number of features in the dataset.
    pub n_features: usize,
    /// Number of training samples.
    pub n_samples: usize,
    /// Resolved max_features value used.
    pub max_features_resolved: usize,
}

/// Result of Random Forest training.
///
/// Contains the fitted forest, impurity importances, optional OOB score,
/// per-tree OOB indices, and training metadata.
#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    importances: Vec<RankedFeature>,
    oob_score: Option<OobScore>,
    oob_indices_per_tree: Vec<Vec<usize>>,
    metadata: TrainingMetadata,
}

impl RandomForestResult {
    /// Create a new training result.
    pub(crate) fn new(
        forest: RandomForest,
        importances: Vec<RankedFeature>,
        oob_score: Option<OobScore>,
        oob_indices_per_tree: Vec<Vec<usize>>,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            forest,
            importances,
            oob_score,
            oob_indices_per_tree,
            metadata,
        }
    }

    /// Borrow the fitted forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Consume the result and return the fitted forest.
    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Return the ranked impurity (MDI) importances.
    #[must_use]
    pub fn importances(&self) -> &[RankedFeature] {
        &self.importances
    }

    /// Return the OOB score, if computed.
    #[must_use]
    pub fn oob_score(&self) -> Option<&OobScore> {
        self.oob_score.as_ref()
    }

    /// Return training metadata.
    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }

    /// Return the per-tree OOB sample indices.
    #[must_use]
    pub fn oob_indices_per_tree(&self) -> &[Vec<usize>] {
        &self.oob_indices_per_tree
    }

    /// Compute permutation feature importance (%IncMSE) using OOB samples.
    ///
    /// Requires the original training data, which is not stored in the result.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                         |
    /// |-----------------------------------|----------------------------------------------|
    /// | [`RfError::LengthMismatch`]       | row or target count differs from training    |
    /// | [`RfError::FeatureCountMismatch`] | a row has the wrong number of features       |
    pub fn permutation_importances(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        seed: u64,
    ) -> Result<Vec<PermutationImportance>, RfError> {
        if features.len() != self.metadata.n_samples {
            return Err(RfError::LengthMismatch {
                left: self.metadata.n_samples,
                right: features.len(),
            });
        }
        if targets.len() != features.len() {
            return Err(RfError::LengthMismatch {
                left: features.len(),
                right: targets.len(),
            });
        }
        if let Some((sample_index, row)) = features
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.forest.n_features)
        {
            return Err(RfError::FeatureCountMismatch {
                expected: self.forest.n_features,
                got: row.len(),
                sample_index,
            });
        }

        Ok(compute_permutation_importance(
            &self.forest,
            features,
            targets,
            &self.oob_indices_per_tree,
            &self.forest.feature_names,
            seed,
        ))
    }
}
