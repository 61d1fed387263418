//! JSON report writer for evaluation outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;

/// File name of the evaluation report inside the output directory.
pub const EVALUATION_FILE: &str = "evaluation.json";

/// Writes the evaluation summary to `{output_dir}/evaluation.json`.
///
/// Creates the output directory on construction if it does not exist.
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Return the directory this writer targets.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write evaluation results to `evaluation.json` and return its path.
    ///
    /// Takes primitives so the writer has no dependency on `appraise-rf`.
    /// `importances` is aligned with `feature_names` as
    /// `(mean %IncMSE, std, scaled, rank)`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] if encoding fails and
    /// [`IoError::WriteFile`] if the file cannot be written.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all)]
    pub fn write_evaluation(
        &self,
        seed: u64,
        n_train: usize,
        n_test: usize,
        n_trees: usize,
        mtry: usize,
        metrics: (f64, f64, f64),
        oob: Option<(f64, f64)>,
        feature_names: &[String],
        importances: &[(f64, f64, f64, usize)],
    ) -> Result<PathBuf, IoError> {
        let path = self.output_dir.join(EVALUATION_FILE);

        let (rmse, mae, r_squared) = metrics;
        let mut features: Vec<FeatureEntry> = feature_names
            .iter()
            .zip(importances)
            .map(|(name, &(importance, std, scaled, rank))| FeatureEntry {
                name: name.as_str(),
                inc_mse: importance,
                std,
                scaled,
                rank,
            })
            .collect();
        features.sort_by_key(|f| f.rank);

        let artifact = EvaluateArtifact {
            seed,
            split: SplitEntry { n_train, n_test },
            forest: ForestEntry { n_trees, mtry },
            metrics: MetricsEntry {
                rmse,
                mae,
                r_squared,
            },
            oob: oob.map(|(mse, r_squared)| OobEntry { mse, r_squared }),
            feature_importances: features,
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "evaluation result written");
        Ok(path)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct EvaluateArtifact<'a> {
    seed: u64,
    split: SplitEntry,
    forest: ForestEntry,
    metrics: MetricsEntry,
    oob: Option<OobEntry>,
    feature_importances: Vec<FeatureEntry<'a>>,
}

#[derive(Serialize)]
struct SplitEntry {
    n_train: usize,
    n_test: usize,
}

#[derive(Serialize)]
struct ForestEntry {
    n_trees: usize,
    mtry: usize,
}

#[derive(Serialize)]
struct MetricsEntry {
    rmse: f64,
    mae: f64,
    r_squared: f64,
}

#[derive(Serialize)]
struct OobEntry {
    mse: f64,
    r_squared: f64,
}

#[derive(Serialize)]
struct FeatureEntry<'a> {
    name: &'a str,
    inc_mse: f64,
    std: f64,
    scaled: f64,
    rank: usize,
}
