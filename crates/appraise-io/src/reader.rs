//! CSV reader for housing data with full input validation.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::dataset::{COLUMN_LABELS, HousingDataset, TARGET_COLUMN};

/// Reads housing data from a CSV file and renames its columns.
///
/// Expected CSV format:
/// - Header row with the 14 raw column names (`crim`, `zn`, ..., `medv`) in any order
/// - One numeric row per census tract, every row with the same number of columns
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::UnknownColumn`] | Header names a column outside the schema |
/// | [`IoError::DuplicateColumn`] | Header names a column twice |
/// | [`IoError::MissingColumn`] | A schema column is absent |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
pub struct DatasetReader {
    path: PathBuf,
}

impl DatasetReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a renamed [`HousingDataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<HousingDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        parse_housing_csv(file, &self.path)
    }
}

fn csv_error(origin: &Path, e: csv::Error) -> IoError {
    IoError::CsvParse {
        path: origin.to_path_buf(),
        offset: e.position().map_or(0, |p| p.byte()),
        source: e,
    }
}

/// Map each header position to its slot in [`COLUMN_LABELS`].
fn resolve_header(header: &csv::StringRecord, origin: &Path) -> Result<Vec<usize>, IoError> {
    let mut slots = Vec::with_capacity(header.len());
    let mut seen = [false; COLUMN_LABELS.len()];

    for name in header.iter() {
        let name = name.trim();
        let slot = COLUMN_LABELS
            .iter()
            .position(|(raw, _)| *raw == name)
            .ok_or_else(|| IoError::UnknownColumn {
                path: origin.to_path_buf(),
                column: name.to_string(),
            })?;
        if seen[slot] {
            return Err(IoError::DuplicateColumn {
                path: origin.to_path_buf(),
                column: name.to_string(),
            });
        }
        seen[slot] = true;
        slots.push(slot);
    }

    if let Some(missing) = seen.iter().position(|&s| !s) {
        return Err(IoError::MissingColumn {
            path: origin.to_path_buf(),
            column: COLUMN_LABELS[missing].0.to_string(),
        });
    }

    Ok(slots)
}

/// Parse and validate housing CSV content from any byte source.
///
/// `origin` names the source in error messages.
pub(crate) fn parse_housing_csv<R: Read>(
    source: R,
    origin: &Path,
) -> Result<HousingDataset, IoError> {
    // flexible(true) lets the InconsistentRowLength check below fire instead
    // of a low-level CsvParse error.
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let header = rdr.headers().map_err(|e| csv_error(origin, e))?.clone();
    let slots = resolve_header(&header, origin)?;
    let expected_cols = header.len();
    debug!(expected_cols, "read CSV header");

    let target_slot = COLUMN_LABELS
        .iter()
        .position(|(raw, _)| *raw == TARGET_COLUMN)
        .unwrap_or(COLUMN_LABELS.len() - 1);

    let mut features = Vec::new();
    let mut targets = Vec::new();

    for (row_index, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| csv_error(origin, e))?;

        if record.len() != expected_cols {
            return Err(IoError::InconsistentRowLength {
                path: origin.to_path_buf(),
                row_index,
                expected: expected_cols,
                got: record.len(),
            });
        }

        let mut values = [0.0f64; COLUMN_LABELS.len()];
        for (col_index, (raw, &slot)) in record.iter().zip(&slots).enumerate() {
            let value = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| IoError::NonFiniteValue {
                    path: origin.to_path_buf(),
                    row_index,
                    col_index,
                    raw: raw.to_string(),
                })?;
            values[slot] = value;
        }

        targets.push(values[target_slot]);
        features.push(
            values
                .iter()
                .enumerate()
                .filter(|&(slot, _)| slot != target_slot)
                .map(|(_, &v)| v)
                .collect::<Vec<f64>>(),
        );
    }

    if targets.is_empty() {
        return Err(IoError::EmptyDataset {
            path: origin.to_path_buf(),
        });
    }

    let feature_names: Vec<String> = COLUMN_LABELS
        .iter()
        .enumerate()
        .filter(|&(slot, _)| slot != target_slot)
        .map(|(_, (_, label))| (*label).to_string())
        .collect();
    let target_name = COLUMN_LABELS[target_slot].1.to_string();

    info!(
        origin = %origin.display(),
        n_samples = targets.len(),
        n_features = feature_names.len(),
        "housing dataset loaded"
    );

    Ok(HousingDataset::new(feature_names, target_name, features, targets))
}
