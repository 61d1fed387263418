//! The housing dataset and its column schema.

use std::path::Path;

use tracing::instrument;

use crate::IoError;
use crate::reader::parse_housing_csv;

/// Raw column name paired with its human-readable label, in canonical order.
///
/// The last entry is the target.
pub const COLUMN_LABELS: [(&str, &str); 14] = [
    ("crim", "Crime_Rate"),
    ("zn", "Residential_Zoning"),
    ("indus", "Industrial_Share"),
    ("chas", "Charles_River"),
    ("nox", "Nitric_Oxides"),
    ("rm", "Avg_Rooms"),
    ("age", "Pre1940_Share"),
    ("dis", "Employment_Distance"),
    ("rad", "Highway_Access"),
    ("tax", "Property_Tax"),
    ("ptratio", "Pupil_Teacher_Ratio"),
    ("b", "B_Index"),
    ("lstat", "Lower_Status_Pct"),
    ("medv", "Home_Value"),
];

/// Raw name of the target column.
pub const TARGET_COLUMN: &str = "medv";

/// Number of predictor columns in the schema.
pub const N_FEATURES: usize = COLUMN_LABELS.len() - 1;

const EMBEDDED_CSV: &str = include_str!("../data/boston.csv");
const EMBEDDED_ORIGIN: &str = "<embedded boston.csv>";

/// Look up the human-readable label for a raw column name.
#[must_use]
pub fn label_for(raw: &str) -> Option<&'static str> {
    COLUMN_LABELS
        .iter()
        .find(|(r, _)| *r == raw)
        .map(|(_, label)| *label)
}

/// Tabular housing data with renamed columns.
///
/// Feature rows and targets are stored in parallel vectors:
/// `features[i]` corresponds to `targets[i]`. Columns follow the order of
/// [`COLUMN_LABELS`] regardless of the order in the source header.
#[derive(Debug, Clone)]
pub struct HousingDataset {
    feature_names: Vec<String>,
    target_name: String,
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl HousingDataset {
    pub(crate) fn new(
        feature_names: Vec<String>,
        target_name: String,
        features: Vec<Vec<f64>>,
        targets: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(features.len(), targets.len());
        Self {
            feature_names,
            target_name,
            features,
            targets,
        }
    }

    /// Parse the copy of the Boston housing data compiled into the crate.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded CSV is malformed; see [`DatasetReader`](crate::DatasetReader)
    /// for the validation performed.
    #[instrument]
    pub fn embedded() -> Result<Self, IoError> {
        parse_housing_csv(EMBEDDED_CSV.as_bytes(), Path::new(EMBEDDED_ORIGIN))
    }

    /// Return the feature rows: `features()[sample][feature]`.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the target values.
    #[must_use]
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Return the renamed feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the renamed target column name.
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.targets.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return a copy of one column by its renamed label (feature or target).
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        if name == self.target_name {
            return Some(self.targets.clone());
        }
        let idx = self.feature_names.iter().position(|n| n == name)?;
        Some(self.features.iter().map(|row| row[idx]).collect())
    }

    /// Return every column name: features first, then the target.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let mut names = self.feature_names.clone();
        names.push(self.target_name.clone());
        names
    }

    /// Return every column as a vector of values, in [`column_names`](Self::column_names) order.
    #[must_use]
    pub fn columns(&self) -> Vec<Vec<f64>> {
        let mut cols: Vec<Vec<f64>> = (0..self.n_features())
            .map(|f| self.features.iter().map(|row| row[f]).collect())
            .collect();
        cols.push(self.targets.clone());
        cols
    }

    /// Return a new dataset holding the given rows, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            target_name: self.target_name.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_dataset_shape() {
        let ds = HousingDataset::embedded().unwrap();
        assert_eq!(ds.n_samples(), 506);
        assert_eq!(ds.n_features(), 13);
        assert_eq!(ds.target_name(), "Home_Value");
        assert_eq!(ds.feature_names()[0], "Crime_Rate");
        assert_eq!(ds.feature_names()[12], "Lower_Status_Pct");
    }

    #[test]
    fn embedded_first_row() {
        let ds = HousingDataset::embedded().unwrap();
        let expected = [
            0.00632, 18.0, 2.31, 0.0, 0.538, 6.575, 65.2, 4.09, 1.0, 296.0, 15.3, 396.9, 4.98,
        ];
        for (got, want) in ds.features()[0].iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
        assert!((ds.targets()[0] - 24.0).abs() < 1e-12);
    }

    #[test]
    fn target_range() {
        let ds = HousingDataset::embedded().unwrap();
        let min = ds.targets().iter().copied().fold(f64::INFINITY, f64::min);
        let max = ds.targets().iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((min - 5.0).abs() < 1e-12);
        assert!((max - 50.0).abs() < 1e-12);
    }

    #[test]
    fn column_lookup() {
        let ds = HousingDataset::embedded().unwrap();
        let rooms = ds.column("Avg_Rooms").unwrap();
        assert_eq!(rooms.len(), 506);
        assert!((rooms[0] - 6.575).abs() < 1e-12);
        assert_eq!(ds.column("Home_Value").unwrap(), ds.targets());
        assert!(ds.column("rm").is_none());
    }

    #[test]
    fn columns_include_target_last() {
        let ds = HousingDataset::embedded().unwrap();
        let names = ds.column_names();
        let cols = ds.columns();
        assert_eq!(names.len(), 14);
        assert_eq!(cols.len(), 14);
        assert_eq!(names[13], "Home_Value");
        assert_eq!(cols[13], ds.targets());
    }

    #[test]
    fn subset_selects_rows() {
        let ds = HousingDataset::embedded().unwrap();
        let sub = ds.subset(&[2, 0]);
        assert_eq!(sub.n_samples(), 2);
        assert_eq!(sub.features()[1], ds.features()[0]);
        assert_eq!(sub.targets()[0], ds.targets()[2]);
        assert_eq!(sub.feature_names(), ds.feature_names());
    }

    #[test]
    fn label_lookup() {
        assert_eq!(label_for("medv"), Some("Home_Value"));
        assert_eq!(label_for("ptratio"), Some("Pupil_Teacher_Ratio"));
        assert_eq!(label_for("price"), None);
        assert_eq!(N_FEATURES, 13);
    }
}
