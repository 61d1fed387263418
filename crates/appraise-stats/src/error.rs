//! Error types for appraise-stats.

/// Errors from statistical computations.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// Returned when a computation receives no usable values.
    #[error("empty input: no finite values")]
    EmptyInput,

    /// Returned when two paired slices differ in length.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first slice.
        left: usize,
        /// Length of the second slice.
        right: usize,
    },

    /// Returned when column names and columns differ in count.
    #[error("{names} column names supplied for {columns} columns")]
    NameCountMismatch {
        /// Number of names.
        names: usize,
        /// Number of columns.
        columns: usize,
    },

    /// Returned when a histogram is requested with zero bins.
    #[error("invalid bin count: {n_bins} (must be >= 1)")]
    InvalidBinCount {
        /// The rejected bin count.
        n_bins: usize,
    },

    /// Returned when a value that must be finite is NaN or infinite.
    #[error("non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the offending value.
        index: usize,
    },

    /// Returned when a line fit has no spread in its x values.
    #[error("cannot fit a trend line: x values have zero variance")]
    DegenerateTrend,
}
