//! I/O error types for appraise-io.

use std::path::PathBuf;

/// Errors from dataset loading, splitting, and report serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV source.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV source.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV source.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a cell value is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV source.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the header names a column outside the housing schema.
    #[error("unknown column \"{column}\" in {path}")]
    UnknownColumn {
        /// Path to the CSV source.
        path: PathBuf,
        /// The unrecognized header name.
        column: String,
    },

    /// Returned when the header names the same column twice.
    #[error("duplicate column \"{column}\" in {path}")]
    DuplicateColumn {
        /// Path to the CSV source.
        path: PathBuf,
        /// The repeated header name.
        column: String,
    },

    /// Returned when a schema column is absent from the header.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV source.
        path: PathBuf,
        /// The raw name of the absent column.
        column: String,
    },

    /// Returned when the train fraction is not strictly between 0 and 1.
    #[error("train fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTrainFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    /// Returned when the number of strata is zero.
    #[error("n_strata must be at least 1, got {n_strata}")]
    InvalidStrataCount {
        /// The invalid stratum count provided.
        n_strata: usize,
    },

    /// Returned when a split is requested on an empty target vector.
    #[error("cannot split an empty target vector")]
    EmptyTarget,

    /// Returned when a target value is NaN or infinite.
    #[error("non-finite target at row {row_index}")]
    NonFiniteTarget {
        /// Zero-based row index.
        row_index: usize,
    },

    /// Returned when the requested proportion would leave one side of the split empty.
    #[error("split leaves an empty partition: {n_train} train rows, {n_test} test rows")]
    EmptyPartition {
        /// Rows assigned to the training side.
        n_train: usize,
        /// Rows assigned to the test side.
        n_test: usize,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a report cannot be encoded as JSON.
    #[error("cannot serialize {path}")]
    Serialize {
        /// Destination of the report.
        path: PathBuf,
        /// Underlying serialization error.
        source: serde_json::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
